//! Schema bootstrap: extension, enum types, tables and indexes, generated from the
//! static table definitions. Every statement is idempotent, so it runs on each start.

use crate::domain::{ENUM_TYPES, INDEXES, TABLES};
use crate::error::StoreError;
use crate::schema::{EnumDef, TableDef};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// CREATE TYPE wrapped in a DO block; PostgreSQL has no `CREATE TYPE IF NOT EXISTS`.
pub fn create_enum_sql(e: &EnumDef) -> String {
    let values: Vec<String> = e.values.iter().map(|v| literal(v)).collect();
    format!(
        "DO $$ BEGIN\n  IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = {}) THEN\n    CREATE TYPE {} AS ENUM ({});\n  END IF;\nEND $$",
        literal(e.name),
        quote(e.name),
        values.join(", ")
    )
}

pub fn create_table_sql(t: &TableDef) -> String {
    let mut defs: Vec<String> = Vec::new();
    for c in t.columns {
        let mut def = format!("{} {}", quote(c.name), c.ty.sql());
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(d) = c.default {
            def.push_str(" DEFAULT ");
            def.push_str(d);
        }
        if c.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(check) = c.check {
            def.push_str(&format!(" CHECK ({})", check));
        }
        defs.push(def);
    }
    defs.push(format!("PRIMARY KEY ({})", quote(t.primary_key)));
    for fk in t.foreign_keys {
        let mut def = format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            quote(fk.column),
            quote(fk.references),
            quote(fk.referenced_column)
        );
        if let Some(action) = fk.on_delete {
            def.push_str(" ON DELETE ");
            def.push_str(action);
        }
        defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(t.name),
        defs.join(",\n  ")
    )
}

/// Statements in dependency order: extension, enums, tables (parents first), indexes.
pub fn bootstrap_statements() -> Vec<String> {
    let mut out = vec!["CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\"".to_string()];
    out.extend(ENUM_TYPES.iter().map(|e| create_enum_sql(e)));
    out.extend(TABLES.iter().map(|t| create_table_sql(t)));
    out.extend(INDEXES.iter().map(|i| i.to_string()));
    out
}

pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    for sql in bootstrap_statements() {
        tracing::debug!(%sql, "bootstrap");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(tables = TABLES.len(), "schema ready");
    Ok(())
}
