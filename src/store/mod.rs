//! Record-store gateway: the persistence operations resource controllers call through.

mod memory;
mod patch;
mod postgres;

pub use memory::{MemoryDatabase, MemoryStore};
pub use patch::{changeset, to_object};
pub use postgres::PgRecordStore;

use crate::error::StoreError;
use crate::schema::Record;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Predicates applied by [`RecordStore::query`]. Each one needs the matching
/// field declared on the record's table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-insensitive substring over the title-like OR description-like field.
    pub search: Option<String>,
    /// Equality on the active flag.
    pub active: Option<bool>,
    /// Eagerly load the table's expandable relation.
    pub expand: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

/// One window of query results plus the count of every matching record.
#[derive(Clone, Debug)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total: u64,
}

#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError>;

    async fn query(
        &self,
        filter: &ListFilter,
        order: SortOrder,
        offset: u64,
        limit: u32,
    ) -> Result<Page<R>, StoreError>;

    /// Runs [`Record::before_create`], writes the record and returns it as stored.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Applies the non-zero fields of `partial`, minus `excluded`, to the stored record.
    async fn patch(&self, id: Uuid, partial: &R, excluded: &[&str]) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Where records live. Hands out a typed store for any record.
#[derive(Clone)]
pub enum Backend {
    Postgres(PgPool),
    Memory(MemoryDatabase),
}

impl Backend {
    pub fn store<R: Record>(&self) -> Arc<dyn RecordStore<R>> {
        match self {
            Backend::Postgres(pool) => Arc::new(PgRecordStore::<R>::new(pool.clone())),
            Backend::Memory(db) => Arc::new(MemoryStore::<R>::new(db.clone())),
        }
    }
}
