//! PostgreSQL record store: SQL built from the record's table definition, rows decoded via JSON.

use crate::error::StoreError;
use crate::schema::{ColumnRole, ColumnType, Record, TableDef};
use crate::sql::{count_matching, delete, insert, select_by_id, select_page, update, PgBindValue, QueryBuf};
use crate::store::patch::{changeset, to_object};
use crate::store::{ListFilter, Page, RecordStore, SortOrder};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::marker::PhantomData;
use uuid::Uuid;

pub struct PgRecordStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> PgRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        PgRecordStore {
            pool,
            _record: PhantomData,
        }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<(), StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    fn decode(row: &PgRow, expand: Option<&str>) -> Result<R, StoreError> {
        let mut value = row_to_json(R::table(), row)?;
        if let (Some(name), Value::Object(map)) = (expand, &mut value) {
            use sqlx::Row;
            let related: Option<Value> = row.try_get(name)?;
            map.insert(name.to_string(), related.unwrap_or_else(|| Value::Array(Vec::new())));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn row_to_json(table: &TableDef, row: &PgRow) -> Result<Value, StoreError> {
    let mut map = serde_json::Map::new();
    for col in table.columns {
        map.insert(col.name.to_string(), cell_to_value(row, col.name, col.ty)?);
    }
    Ok(Value::Object(map))
}

fn cell_to_value(row: &PgRow, name: &str, ty: ColumnType) -> Result<Value, StoreError> {
    use sqlx::Row;
    let value = match ty {
        ColumnType::Uuid => row
            .try_get::<Option<Uuid>, _>(name)?
            .map(|u| Value::String(u.to_string())),
        ColumnType::Text | ColumnType::Char(_) | ColumnType::Enum(_) => {
            row.try_get::<Option<String>, _>(name)?.map(Value::String)
        }
        ColumnType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        ColumnType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(|n| Value::Number(n.into())),
        ColumnType::Integer => row.try_get::<Option<i32>, _>(name)?.map(|n| Value::Number(n.into())),
        ColumnType::Timestamptz => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
            .map(|d| Value::String(d.to_rfc3339())),
        ColumnType::Jsonb => row.try_get::<Option<Value>, _>(name)?,
    };
    Ok(value.unwrap_or(Value::Null))
}

#[async_trait]
impl<R: Record> RecordStore<R> for PgRecordStore<R> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let mut q = select_by_id(R::table());
        q.params.push(Value::String(id.to_string()));
        match self.fetch_optional(&q).await? {
            Some(row) => Ok(Some(Self::decode(&row, None)?)),
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
        let count_q = count_matching(table, filter)?;
        let page_q = select_page(table, filter, order, offset, limit)?;

        let total = match self.fetch_optional(&count_q).await? {
            Some(row) => {
                use sqlx::Row;
                row.try_get::<i64, _>(0)?.max(0) as u64
            }
            None => 0,
        };
        let expand = filter.expand.then(|| table.expand.map(|r| r.name)).flatten();
        let items = self
            .fetch_all(&page_q)
            .await?
            .iter()
            .map(|row| Self::decode(row, expand))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }

    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        let table = R::table();
        record.before_create();
        let zero = to_object(&R::default())?;
        let mut row = to_object(&record)?;
        // Zero lifecycle timestamps go out as NULL so the column default stamps them.
        for col in table.columns.iter().filter(|c| c.role != ColumnRole::Plain) {
            if row.get(col.name) == zero.get(col.name) {
                row.insert(col.name.to_string(), Value::Null);
            }
        }
        let q = insert(table, &row);
        let saved = self
            .fetch_optional(&q)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))?;
        Self::decode(&saved, None)
    }

    async fn patch(&self, id: Uuid, partial: &R, excluded: &[&str]) -> Result<(), StoreError> {
        let set = changeset(partial, excluded)?;
        match update(R::table(), &Value::String(id.to_string()), &set) {
            Some(q) => self.execute(&q).await,
            None => Ok(()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut q = delete(R::table());
        q.params.push(Value::String(id.to_string()));
        self.execute(&q).await
    }
}
