//! Create hook invoked between input mapping and persistence.

use crate::error::HookError;
use crate::schema::Record;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Method},
};

/// Request metadata handed to [`PerformCreate`] hooks.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
        })
    }
}

/// Injects server-side defaults or validation into a record about to be inserted.
/// An error aborts the create; nothing is written.
#[async_trait]
pub trait PerformCreate<R: Record>: Send + Sync {
    async fn perform_create(&self, ctx: &RequestContext, record: &mut R) -> Result<(), HookError>;
}
