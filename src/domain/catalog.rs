//! Products, their variants, and variant stock levels.

use crate::schema::{ColumnDef, ColumnType, ForeignKey, Record, RelationDef, SearchFields, TableDef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Filled only when a list expands variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    /// Free-form JSON (color, size, ...).
    pub attributes: Option<serde_json::Value>,
    pub price_minor: i64,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub static PRODUCTS: TableDef = TableDef {
    name: "products",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("title", ColumnType::Text),
        ColumnDef::new("description", ColumnType::Text).nullable(),
        ColumnDef::new("is_active", ColumnType::Boolean).default_sql("true"),
        ColumnDef::created_at("created_at"),
        ColumnDef::updated_at("updated_at"),
    ],
    foreign_keys: &[],
    search: Some(SearchFields {
        title: "title",
        description: "description",
    }),
    active: Some("is_active"),
    expand: Some(RelationDef {
        name: "variants",
        related: &PRODUCT_VARIANTS,
        foreign_key: "product_id",
    }),
};

pub static PRODUCT_VARIANTS: TableDef = TableDef {
    name: "product_variants",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("product_id", ColumnType::Uuid),
        ColumnDef::new("sku", ColumnType::Text).unique(),
        ColumnDef::new("attributes", ColumnType::Jsonb).nullable(),
        ColumnDef::new("price_minor", ColumnType::BigInt).check("price_minor >= 0"),
        ColumnDef::new("currency", ColumnType::Char(3)),
        ColumnDef::new("is_active", ColumnType::Boolean).default_sql("true"),
        ColumnDef::created_at("created_at"),
        ColumnDef::updated_at("updated_at"),
    ],
    foreign_keys: &[ForeignKey {
        column: "product_id",
        references: "products",
        referenced_column: "id",
        on_delete: Some("CASCADE"),
    }],
    search: None,
    active: Some("is_active"),
    expand: None,
};

pub static INVENTORY: TableDef = TableDef {
    name: "inventories",
    primary_key: "variant_id",
    columns: &[
        ColumnDef::new("variant_id", ColumnType::Uuid),
        ColumnDef::new("qty_on_hand", ColumnType::BigInt).default_sql("0").check("qty_on_hand >= 0"),
        ColumnDef::new("qty_reserved", ColumnType::BigInt).default_sql("0").check("qty_reserved >= 0"),
        ColumnDef::updated_at("updated_at"),
    ],
    foreign_keys: &[ForeignKey {
        column: "variant_id",
        references: "product_variants",
        referenced_column: "id",
        on_delete: Some("CASCADE"),
    }],
    search: None,
    active: None,
    expand: None,
};

impl Record for Product {
    fn table() -> &'static TableDef {
        &PRODUCTS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

impl Record for ProductVariant {
    fn table() -> &'static TableDef {
        &PRODUCT_VARIANTS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
