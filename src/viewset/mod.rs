//! Generic resource controller: list, retrieve, create, update and delete for
//! any record type, parametrized by its create and update input types.
//!
//! Operations are plain async methods returning `Result<_, AppError>`; the
//! axum handlers in [`handlers`] only extract request parts and delegate.

mod handlers;
mod hook;
mod query;

pub use handlers::Operation;
pub use hook::{PerformCreate, RequestContext};
pub use query::{ListParams, ListQuery};

use crate::config::ListDefaults;
use crate::error::AppError;
use crate::response::{ListEnvelope, MessageBody, Pagination};
use crate::schema::Record;
use crate::store::{RecordStore, SortOrder};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Object not found";

pub struct ViewSet<R: Record, C, U> {
    store: Arc<dyn RecordStore<R>>,
    create_to_record: fn(C) -> R,
    update_to_record: fn(U) -> R,
    perform_create: Option<Arc<dyn PerformCreate<R>>>,
    list_defaults: ListDefaults,
}

impl<R: Record, C, U> Clone for ViewSet<R, C, U> {
    fn clone(&self) -> Self {
        ViewSet {
            store: self.store.clone(),
            create_to_record: self.create_to_record,
            update_to_record: self.update_to_record,
            perform_create: self.perform_create.clone(),
            list_defaults: self.list_defaults,
        }
    }
}

/// Parse a path identifier; anything that is not a UUID is the caller's fault.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidArgument("Invalid ID".into()))
}

/// Decode a JSON body and run the input type's field validation.
pub fn decode_input<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<T, AppError> {
    let input: T = serde_json::from_slice(body).map_err(|e| AppError::InvalidArgument(e.to_string()))?;
    input
        .validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
    Ok(input)
}

impl<R, C, U> ViewSet<R, C, U>
where
    R: Record,
    C: DeserializeOwned + Validate + Send + 'static,
    U: DeserializeOwned + Validate + Send + 'static,
{
    pub fn new(store: Arc<dyn RecordStore<R>>, create_to_record: fn(C) -> R, update_to_record: fn(U) -> R) -> Self {
        ViewSet {
            store,
            create_to_record,
            update_to_record,
            perform_create: None,
            list_defaults: ListDefaults::default(),
        }
    }

    pub fn with_perform_create(mut self, hook: Arc<dyn PerformCreate<R>>) -> Self {
        self.perform_create = Some(hook);
        self
    }

    pub fn with_list_defaults(mut self, defaults: ListDefaults) -> Self {
        self.list_defaults = defaults;
        self
    }

    fn internal(&self, message: &'static str, cause: impl Display) -> AppError {
        tracing::error!(table = R::table().name, error = %cause, "{}", message);
        AppError::Internal(message.into())
    }

    async fn load(&self, id: Uuid) -> Result<R, AppError> {
        match self.store.find_by_id(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(AppError::NotFound(NOT_FOUND.into())),
            Err(e) => Err(self.internal("Unable to fetch object", e)),
        }
    }

    pub async fn retrieve(&self, id: &str) -> Result<R, AppError> {
        let id = parse_id(id)?;
        self.load(id).await
    }

    pub async fn list(&self, params: &ListParams) -> Result<ListEnvelope<R>, AppError> {
        let query = params.resolve(self.list_defaults);
        let page = self
            .store
            .query(&query.filter, SortOrder::NewestFirst, query.offset(), query.limit)
            .await
            .map_err(|e| self.internal("Unable to fetch objects", e))?;
        Ok(ListEnvelope {
            data: page.items,
            pagination: Pagination {
                page: query.page,
                limit: query.limit,
                total: page.total,
            },
        })
    }

    pub async fn create(&self, ctx: &RequestContext, body: &[u8]) -> Result<R, AppError> {
        let input: C = decode_input(body)?;
        let mut record = (self.create_to_record)(input);
        if let Some(hook) = &self.perform_create {
            hook.perform_create(ctx, &mut record)
                .await
                .map_err(|e| self.internal("Unable to prepare object", e))?;
        }
        let saved = self
            .store
            .insert(record)
            .await
            .map_err(|e| self.internal("Unable to create object", e))?;
        tracing::debug!(table = R::table().name, id = %saved.id(), "created");
        Ok(saved)
    }

    /// Merge the non-zero fields of the mapped input into the stored record and
    /// return the reloaded record. The identifier is never part of the merge.
    pub async fn update(&self, id: &str, body: &[u8]) -> Result<R, AppError> {
        let id = parse_id(id)?;
        self.load(id).await?;
        let input: U = decode_input(body)?;
        let partial = (self.update_to_record)(input);
        self.store
            .patch(id, &partial, &[R::table().primary_key])
            .await
            .map_err(|e| self.internal("Unable to update object", e))?;
        match self.store.find_by_id(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(self.internal("Unable to load updated object", "record vanished after update")),
            Err(e) => Err(self.internal("Unable to load updated object", e)),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<MessageBody, AppError> {
        let id = parse_id(id)?;
        self.load(id).await?;
        self.store
            .delete(id)
            .await
            .map_err(|e| self.internal("Unable to delete object", e))?;
        Ok(MessageBody {
            message: "Object deleted",
        })
    }
}
