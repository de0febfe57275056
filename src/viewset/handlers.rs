//! Axum handlers and route wiring for a [`ViewSet`].

use super::{ListParams, RequestContext, ViewSet};
use crate::error::AppError;
use crate::response::ok;
use crate::schema::Record;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// Operations a resource exposes. Each maps to one method on one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// `GET <path>`
    List,
    /// `POST <path>`
    Create,
    /// `GET <path>/:id`
    Retrieve,
    /// `PATCH <path>/:id`
    Update,
    /// `DELETE <path>/:id`
    Delete,
}

async fn list_handler<R, C, U>(
    State(vs): State<Arc<ViewSet<R, C, U>>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    Ok(ok(vs.list(&ListParams::from_pairs(query)).await?))
}

async fn create_handler<R, C, U>(
    State(vs): State<Arc<ViewSet<R, C, U>>>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    Ok(ok(vs.create(&ctx, &body).await?))
}

async fn retrieve_handler<R, C, U>(
    State(vs): State<Arc<ViewSet<R, C, U>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    Ok(ok(vs.retrieve(&id).await?))
}

async fn update_handler<R, C, U>(
    State(vs): State<Arc<ViewSet<R, C, U>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    Ok(ok(vs.update(&id, &body).await?))
}

async fn delete_handler<R, C, U>(
    State(vs): State<Arc<ViewSet<R, C, U>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    Ok(ok(vs.delete(&id).await?))
}

fn add<S: Clone + Send + Sync + 'static>(
    acc: Option<MethodRouter<S>>,
    next: MethodRouter<S>,
) -> Option<MethodRouter<S>> {
    Some(match acc {
        Some(m) => m.merge(next),
        None => next,
    })
}

impl<R, C, U> ViewSet<R, C, U>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + Sync + 'static,
    U: DeserializeOwned + Validate + Send + Sync + 'static,
{
    /// Router serving `ops` under `path` (e.g. `/products`) and `path/:id`.
    pub fn into_router(self, path: &str, ops: &[Operation]) -> Router {
        let state = Arc::new(self);
        let mut collection: Option<MethodRouter<Arc<ViewSet<R, C, U>>>> = None;
        let mut member: Option<MethodRouter<Arc<ViewSet<R, C, U>>>> = None;
        for op in ops {
            match op {
                Operation::List => collection = add(collection, get(list_handler::<R, C, U>)),
                Operation::Create => collection = add(collection, post(create_handler::<R, C, U>)),
                Operation::Retrieve => member = add(member, get(retrieve_handler::<R, C, U>)),
                Operation::Update => member = add(member, patch(update_handler::<R, C, U>)),
                Operation::Delete => member = add(member, delete(delete_handler::<R, C, U>)),
            }
        }
        let mut router = Router::new();
        if let Some(m) = collection {
            router = router.route(path, m);
        }
        if let Some(m) = member {
            router = router.route(&format!("{}/:id", path.trim_end_matches('/')), m);
        }
        router.with_state(state)
    }
}
