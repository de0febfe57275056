use crate::schema::{ColumnDef, ColumnType, TableDef};

/// Customers are referenced by orders; no routes are bound to them.
pub static CUSTOMERS: TableDef = TableDef {
    name: "customers",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("first_name", ColumnType::Text),
        ColumnDef::new("last_name", ColumnType::Text),
        ColumnDef::new("email", ColumnType::Text).unique(),
        ColumnDef::new("phone", ColumnType::Text),
        ColumnDef::created_at("created_at"),
    ],
    foreign_keys: &[],
    search: None,
    active: None,
    expand: None,
};
