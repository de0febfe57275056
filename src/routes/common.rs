//! Common routes: health, readiness, version.

use crate::state::AppState;
use crate::store::Backend;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "success",
        message: "Service is healthy",
    })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let database = match &state.backend {
        Backend::Postgres(pool) => match sqlx::query("SELECT 1").fetch_optional(pool).await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "readiness probe failed");
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ReadyBody {
                        status: "degraded",
                        database: "unavailable",
                    }),
                );
            }
        },
        Backend::Memory(_) => "ok",
    };
    (StatusCode::OK, Json(ReadyBody { status: "ok", database }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
