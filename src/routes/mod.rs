//! HTTP surface: operational routes plus the versioned resource API.

mod catalog;
mod common;
mod orders;

pub use catalog::{catalog_routes, ProductRequest, VariantRequest};
pub use common::common_routes;
pub use orders::{order_routes, OrderItemPricing, OrderItemRequest, OrderRequest};

use crate::config::ListDefaults;
use crate::state::AppState;
use crate::store::Backend;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Every resource under `/api/v1`.
pub fn api_routes(backend: &Backend, list: ListDefaults) -> Router {
    Router::new().nest(
        "/api/v1",
        catalog_routes(backend, list).merge(order_routes(backend, list)),
    )
}

/// Full application router with request tracing and a request body size cap.
/// axum's own 2 MiB extractor limit is disabled so `body_limit_bytes` is the only cap.
pub fn app(state: AppState, list: ListDefaults, body_limit_bytes: usize) -> Router {
    let api = api_routes(&state.backend, list);
    common_routes(state)
        .merge(api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
