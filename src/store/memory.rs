//! In-memory record store for tests and development. Rows are kept as JSON
//! objects per table so every record type shares one database, which is what
//! relation expansion needs.

use crate::error::StoreError;
use crate::schema::{Record, TableDef};
use crate::store::patch::{changeset, to_object};
use crate::store::{ListFilter, Page, RecordStore, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Row = Map<String, Value>;

#[derive(Default)]
struct Tables {
    /// Insertion counter; breaks ordering ties so later inserts sort as newer.
    next_seq: u64,
    rows: HashMap<&'static str, HashMap<Uuid, (u64, Row)>>,
}

/// Shared, thread-safe set of in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Typed view of one table in a [`MemoryDatabase`].
pub struct MemoryStore<R> {
    db: MemoryDatabase,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new(db: MemoryDatabase) -> Self {
        MemoryStore {
            db,
            _record: PhantomData,
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

fn now_value() -> Result<Value, StoreError> {
    Ok(serde_json::to_value(Utc::now())?)
}

fn timestamp(row: &Row, column: &str) -> Option<DateTime<Utc>> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

fn contains_ci(row: &Row, column: &str, needle: &str) -> bool {
    row.get(column)
        .and_then(Value::as_str)
        .map(|s| s.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Fails when the filter names a field the table does not declare.
fn check_filter(table: &TableDef, filter: &ListFilter) -> Result<(), StoreError> {
    let unsupported = |filter: &'static str| StoreError::UnsupportedFilter {
        table: table.name,
        filter,
    };
    if filter.search.is_some() && table.search.is_none() {
        return Err(unsupported("search"));
    }
    if filter.active.is_some() && table.active.is_none() {
        return Err(unsupported("active"));
    }
    if filter.expand && table.expand.is_none() {
        return Err(unsupported("expand"));
    }
    Ok(())
}

fn matches(table: &TableDef, row: &Row, filter: &ListFilter) -> bool {
    if let (Some(search), Some(fields)) = (filter.search.as_deref(), table.search) {
        let needle = search.to_lowercase();
        if !contains_ci(row, fields.title, &needle) && !contains_ci(row, fields.description, &needle) {
            return false;
        }
    }
    if let (Some(active), Some(column)) = (filter.active, table.active) {
        if row.get(column).and_then(Value::as_bool) != Some(active) {
            return false;
        }
    }
    true
}

/// Sorts `(seq, row)` pairs by the table's created-at column, falling back to insertion order.
fn sort_rows(table: &TableDef, rows: &mut [(u64, Row)], order: SortOrder) {
    let created = table.created_at().map(|c| c.name);
    rows.sort_by(|(seq_a, a), (seq_b, b)| {
        let by_time = match created {
            Some(col) => timestamp(a, col).cmp(&timestamp(b, col)),
            None => std::cmp::Ordering::Equal,
        };
        let ord = by_time.then(seq_a.cmp(seq_b));
        match order {
            SortOrder::OldestFirst => ord,
            SortOrder::NewestFirst => ord.reverse(),
        }
    });
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let tables = self.db.inner.read().map_err(poisoned)?;
        let row = tables
            .rows
            .get(R::table().name)
            .and_then(|t| t.get(&id))
            .map(|(_, row)| row.clone());
        match row {
            Some(row) => Ok(Some(serde_json::from_value(Value::Object(row))?)),
            None => Ok(None),
        }
    }

    async fn query(
        &self,
        filter: &ListFilter,
        order: SortOrder,
        offset: u64,
        limit: u32,
    ) -> Result<Page<R>, StoreError> {
        let table = R::table();
        check_filter(table, filter)?;
        let tables = self.db.inner.read().map_err(poisoned)?;
        let mut matched = Vec::new();
        if let Some(rows) = tables.rows.get(table.name) {
            for (seq, row) in rows.values() {
                if matches(table, row, filter) {
                    matched.push((*seq, row.clone()));
                }
            }
        }
        let total = matched.len() as u64;
        sort_rows(table, &mut matched, order);

        let mut items = Vec::new();
        for (_, mut row) in matched.into_iter().skip(offset as usize).take(limit as usize) {
            if let (true, Some(rel)) = (filter.expand, table.expand) {
                let key = row.get(table.primary_key).cloned().unwrap_or(Value::Null);
                let mut related: Vec<(u64, Row)> = tables
                    .rows
                    .get(rel.related.name)
                    .map(|t| {
                        t.values()
                            .filter(|(_, r)| r.get(rel.foreign_key) == Some(&key))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                sort_rows(rel.related, &mut related, SortOrder::OldestFirst);
                let related = related.into_iter().map(|(_, r)| Value::Object(r)).collect();
                row.insert(rel.name.to_string(), Value::Array(related));
            }
            items.push(serde_json::from_value(Value::Object(row))?);
        }
        Ok(Page { items, total })
    }

    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        let table = R::table();
        record.before_create();
        let id = record.id();
        let zero = to_object(&R::default())?;
        let mut source = to_object(&record)?;

        let mut row = Row::new();
        let now = now_value()?;
        for col in table.columns {
            let value = source.remove(col.name).unwrap_or(Value::Null);
            let lifecycle = col.role != crate::schema::ColumnRole::Plain;
            if lifecycle && (value.is_null() || zero.get(col.name) == Some(&value)) {
                row.insert(col.name.to_string(), now.clone());
            } else {
                row.insert(col.name.to_string(), value);
            }
        }

        let mut tables = self.db.inner.write().map_err(poisoned)?;
        let seq = tables.next_seq;
        tables.next_seq += 1;
        let rows = tables.rows.entry(table.name).or_default();
        if rows.contains_key(&id) {
            return Err(StoreError::Constraint {
                table: table.name,
                column: table.primary_key.to_string(),
            });
        }
        for col in table.columns.iter().filter(|c| c.unique) {
            let value = &row[col.name];
            if !value.is_null() && rows.values().any(|(_, r)| r.get(col.name) == Some(value)) {
                return Err(StoreError::Constraint {
                    table: table.name,
                    column: col.name.to_string(),
                });
            }
        }
        rows.insert(id, (seq, row.clone()));
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    async fn patch(&self, id: Uuid, partial: &R, excluded: &[&str]) -> Result<(), StoreError> {
        let table = R::table();
        let set = changeset(partial, excluded)?;
        if set.is_empty() {
            return Ok(());
        }
        let now = now_value()?;
        let mut tables = self.db.inner.write().map_err(poisoned)?;
        let rows = tables.rows.entry(table.name).or_default();
        for col in table.columns.iter().filter(|c| c.unique) {
            if let Some(value) = set.get(col.name) {
                if rows.iter().any(|(other, (_, r))| *other != id && r.get(col.name) == Some(value)) {
                    return Err(StoreError::Constraint {
                        table: table.name,
                        column: col.name.to_string(),
                    });
                }
            }
        }
        if let Some((_, row)) = rows.get_mut(&id) {
            for (k, v) in set {
                row.insert(k, v);
            }
            if let Some(col) = table.updated_at() {
                row.insert(col.name.to_string(), now);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.db.inner.write().map_err(poisoned)?;
        if let Some(rows) = tables.rows.get_mut(R::table().name) {
            rows.remove(&id);
        }
        Ok(())
    }
}
