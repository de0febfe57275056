//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from table definitions.

use crate::error::StoreError;
use crate::schema::{ColumnDef, TableDef};
use crate::store::{ListFilter, SortOrder};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from table definitions).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a parameter and return its placeholder cast to the column type.
    fn push_cast(&mut self, v: Value, col: &ColumnDef) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, col.ty.sql())
    }
}

/// SELECT list: each column as-is, except enum columns as col::text so they decode as String.
fn select_column_list(table: &TableDef, alias: Option<&str>) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            let expr = match alias {
                Some(a) => format!("{}.{}", a, q),
                None => q.clone(),
            };
            if c.ty.is_enum() {
                format!("{}::text AS {}", expr, q)
            } else if alias.is_some() {
                format!("{} AS {}", expr, q)
            } else {
                expr
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape LIKE metacharacters so the search term matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// WHERE clause for a list filter; params are appended to `q`.
fn where_clause(table: &TableDef, filter: &ListFilter, q: &mut QueryBuf) -> Result<String, StoreError> {
    let mut parts = Vec::new();
    if let Some(search) = filter.search.as_deref() {
        let fields = table.search.ok_or(StoreError::UnsupportedFilter {
            table: table.name,
            filter: "search",
        })?;
        let n = q.push_param(Value::String(like_pattern(search)));
        parts.push(format!(
            "({} ILIKE ${n}::text OR {} ILIKE ${n}::text)",
            quoted(fields.title),
            quoted(fields.description),
            n = n
        ));
    }
    if let Some(active) = filter.active {
        let column = table.active.ok_or(StoreError::UnsupportedFilter {
            table: table.name,
            filter: "active",
        })?;
        let n = q.push_param(Value::Bool(active));
        parts.push(format!("{} = ${}::boolean", quoted(column), n));
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

/// ORDER BY the created-at column, or the primary key for tables without one.
fn order_clause(table: &TableDef, order: SortOrder, alias: Option<&str>) -> String {
    let column = table.created_at().map(|c| c.name).unwrap_or(table.primary_key);
    let dir = match order {
        SortOrder::NewestFirst => "DESC",
        SortOrder::OldestFirst => "ASC",
    };
    let prefix = alias.map(|a| format!("{}.", a)).unwrap_or_default();
    format!(" ORDER BY {}{} {}", prefix, quoted(column), dir)
}

/// SELECT by primary key. Caller binds the id as sole param.
pub fn select_by_id(table: &TableDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::uuid",
        select_column_list(table, None),
        quoted(table.name),
        quoted(table.primary_key)
    );
    q
}

/// COUNT(*) of rows matching the filter, ignoring any page window.
pub fn count_matching(table: &TableDef, filter: &ListFilter) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let where_ = where_clause(table, filter, &mut q)?;
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(table.name), where_);
    Ok(q)
}

/// One page of matching rows. With `filter.expand`, the table's relation is
/// selected as a JSON array subquery under the relation's name.
pub fn select_page(
    table: &TableDef,
    filter: &ListFilter,
    order: SortOrder,
    offset: u64,
    limit: u32,
) -> Result<QueryBuf, StoreError> {
    const MAIN_ALIAS: &str = "main";
    let mut q = QueryBuf::new();
    let mut select_parts = vec![select_column_list(table, Some(MAIN_ALIAS))];
    if filter.expand {
        let rel = table.expand.ok_or(StoreError::UnsupportedFilter {
            table: table.name,
            filter: "expand",
        })?;
        let sub_from = format!(
            "{} WHERE {} = {}.{}",
            quoted(rel.related.name),
            quoted(rel.foreign_key),
            MAIN_ALIAS,
            quoted(table.primary_key)
        );
        select_parts.push(format!(
            "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM (SELECT {} FROM {}{}) sub) AS {}",
            select_column_list(rel.related, None),
            sub_from,
            order_clause(rel.related, SortOrder::OldestFirst, None),
            quoted(rel.name)
        ));
    }
    let where_ = where_clause(table, filter, &mut q)?;
    q.sql = format!(
        "SELECT {} FROM {} {}{}{} LIMIT {} OFFSET {}",
        select_parts.join(", "),
        quoted(table.name),
        MAIN_ALIAS,
        where_,
        order_clause(table, order, Some(MAIN_ALIAS)),
        limit,
        offset
    );
    Ok(q)
}

/// INSERT every column present in `row`; RETURNING the stored row.
/// Null values for columns with a default are left out so the database fills them.
pub fn insert(table: &TableDef, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns {
        let Some(val) = row.get(c.name) else { continue };
        if val.is_null() && c.default.is_some() {
            continue;
        }
        placeholders.push(q.push_cast(val.clone(), c));
        cols.push(quoted(c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table, None)
    );
    q
}

/// UPDATE by id: SET only the given columns, plus the updated-at stamp.
/// Returns `None` when there is nothing to set.
pub fn update(table: &TableDef, id: &Value, set: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in set {
        if k == table.primary_key {
            continue;
        }
        let Some(c) = table.column(k) else { continue };
        let rhs = q.push_cast(v.clone(), c);
        sets.push(format!("{} = {}", quoted(k), rhs));
    }
    if sets.is_empty() {
        return None;
    }
    if let Some(c) = table.updated_at() {
        if !set.contains_key(c.name) {
            sets.push(format!("{} = NOW()", quoted(c.name)));
        }
    }
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid",
        quoted(table.name),
        sets.join(", "),
        quoted(table.primary_key),
        id_param
    );
    Some(q)
}

/// DELETE by id. Caller binds the id as sole param.
pub fn delete(table: &TableDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1::uuid",
        quoted(table.name),
        quoted(table.primary_key)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ORDERS, ORDER_ITEMS, PRODUCTS};
    use serde_json::json;

    #[test]
    fn page_query_filters_orders_and_windows() {
        let filter = ListFilter {
            search: Some("abc".into()),
            active: Some(true),
            expand: false,
        };
        let q = select_page(&PRODUCTS, &filter, SortOrder::NewestFirst, 10, 10).unwrap();
        assert!(q.sql.contains(r#"("title" ILIKE $1::text OR "description" ILIKE $1::text)"#));
        assert!(q.sql.contains(r#""is_active" = $2::boolean"#));
        assert!(q.sql.ends_with(r#"ORDER BY main."created_at" DESC LIMIT 10 OFFSET 10"#));
        assert_eq!(q.params, vec![json!("%abc%"), json!(true)]);
    }

    #[test]
    fn count_shares_the_predicate_but_not_the_window() {
        let filter = ListFilter {
            search: Some("lamp".into()),
            ..ListFilter::default()
        };
        let q = count_matching(&PRODUCTS, &filter).unwrap();
        assert!(q.sql.starts_with(r#"SELECT COUNT(*) FROM "products" WHERE"#));
        assert!(!q.sql.contains("LIMIT"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn expand_adds_related_subquery() {
        let filter = ListFilter {
            expand: true,
            ..ListFilter::default()
        };
        let q = select_page(&PRODUCTS, &filter, SortOrder::NewestFirst, 0, 10).unwrap();
        assert!(q.sql.contains(r#"FROM "product_variants" WHERE "product_id" = main."id""#));
        assert!(q.sql.contains(r#"AS "variants""#));
    }

    #[test]
    fn undeclared_filters_fail() {
        let filter = ListFilter {
            active: Some(true),
            ..ListFilter::default()
        };
        assert!(matches!(
            select_page(&ORDER_ITEMS, &filter, SortOrder::NewestFirst, 0, 10),
            Err(StoreError::UnsupportedFilter { filter: "active", .. })
        ));
    }

    #[test]
    fn tables_without_created_at_order_by_primary_key() {
        let q = select_page(&ORDER_ITEMS, &ListFilter::default(), SortOrder::NewestFirst, 0, 5).unwrap();
        assert!(q.sql.contains(r#"ORDER BY main."id" DESC"#));
    }

    #[test]
    fn enum_columns_are_selected_as_text() {
        let q = select_by_id(&ORDERS);
        assert!(q.sql.contains(r#""status"::text AS "status""#));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
    }

    #[test]
    fn update_stamps_updated_at_and_skips_primary_key() {
        let mut set = Map::new();
        set.insert("id".into(), json!("ignored"));
        set.insert("title".into(), json!("New"));
        let q = update(&PRODUCTS, &json!("7f1c0e7e-7a43-4bb0-a6a2-1b6f6f1d0a11"), &set).unwrap();
        assert_eq!(
            q.sql,
            r#"UPDATE "products" SET "title" = $1::text, "updated_at" = NOW() WHERE "id" = $2::uuid"#
        );
        assert!(update(&PRODUCTS, &json!("x"), &Map::new()).is_none());
    }

    #[test]
    fn insert_leaves_defaulted_nulls_to_the_database() {
        let mut row = Map::new();
        row.insert("id".into(), json!("7f1c0e7e-7a43-4bb0-a6a2-1b6f6f1d0a11"));
        row.insert("title".into(), json!("Widget"));
        row.insert("description".into(), Value::Null);
        row.insert("created_at".into(), Value::Null);
        let q = insert(&PRODUCTS, &row);
        assert!(q.sql.starts_with(r#"INSERT INTO "products" ("id", "title", "description") VALUES ($1::uuid, $2::text, $3::text)"#));
        assert_eq!(q.params.len(), 3);
    }
}
