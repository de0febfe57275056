//! Orders, their line items, and the payment/refund/audit tables hanging off them.

use crate::domain::enums::OrderStatus;
use crate::schema::{ColumnDef, ColumnType, ForeignKey, Record, TableDef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub subtotal_minor: i64,
    pub total_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-locking counter. Nothing reads or bumps it yet.
    pub version: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i64,
    pub unit_price_minor: i64,
    pub currency: String,
    pub line_total_minor: i64,
}

pub static ORDERS: TableDef = TableDef {
    name: "orders",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("customer_id", ColumnType::Uuid).nullable(),
        ColumnDef::new("status", ColumnType::Enum("order_status")).default_sql("'draft'"),
        ColumnDef::new("subtotal_minor", ColumnType::BigInt).default_sql("0").check("subtotal_minor >= 0"),
        ColumnDef::new("total_minor", ColumnType::BigInt).default_sql("0").check("total_minor >= 0"),
        ColumnDef::new("currency", ColumnType::Char(3)),
        ColumnDef::created_at("created_at"),
        ColumnDef::updated_at("updated_at"),
        ColumnDef::new("version", ColumnType::Integer).default_sql("1"),
    ],
    foreign_keys: &[],
    search: None,
    active: None,
    expand: None,
};

pub static ORDER_ITEMS: TableDef = TableDef {
    name: "order_items",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("order_id", ColumnType::Uuid),
        ColumnDef::new("variant_id", ColumnType::Uuid),
        ColumnDef::new("quantity", ColumnType::BigInt).check("quantity > 0"),
        ColumnDef::new("unit_price_minor", ColumnType::BigInt).check("unit_price_minor >= 0"),
        ColumnDef::new("currency", ColumnType::Char(3)),
        ColumnDef::new("line_total_minor", ColumnType::BigInt).check("line_total_minor >= 0"),
    ],
    foreign_keys: &[
        ForeignKey {
            column: "order_id",
            references: "orders",
            referenced_column: "id",
            on_delete: Some("CASCADE"),
        },
        ForeignKey {
            column: "variant_id",
            references: "product_variants",
            referenced_column: "id",
            on_delete: None,
        },
    ],
    search: None,
    active: None,
    expand: None,
};

pub static PAYMENTS: TableDef = TableDef {
    name: "payments",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("order_id", ColumnType::Uuid),
        ColumnDef::new("provider", ColumnType::Text),
        ColumnDef::new("status", ColumnType::Enum("payment_status")).default_sql("'pending'"),
        ColumnDef::new("amount_minor", ColumnType::BigInt).check("amount_minor >= 0"),
        ColumnDef::new("currency", ColumnType::Char(3)),
        // gateway payment intent id
        ColumnDef::new("external_ref", ColumnType::Text).nullable(),
        ColumnDef::created_at("created_at"),
        ColumnDef::updated_at("updated_at"),
    ],
    foreign_keys: &[ForeignKey {
        column: "order_id",
        references: "orders",
        referenced_column: "id",
        on_delete: Some("CASCADE"),
    }],
    search: None,
    active: None,
    expand: None,
};

pub static REFUNDS: TableDef = TableDef {
    name: "refunds",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("order_id", ColumnType::Uuid),
        ColumnDef::new("payment_id", ColumnType::Uuid).nullable(),
        ColumnDef::new("status", ColumnType::Enum("refund_status")).default_sql("'pending'"),
        ColumnDef::new("amount_minor", ColumnType::BigInt).check("amount_minor >= 0"),
        ColumnDef::new("reason", ColumnType::Text).nullable(),
        ColumnDef::created_at("created_at"),
        ColumnDef::new("processed_at", ColumnType::Timestamptz).nullable(),
    ],
    foreign_keys: &[
        ForeignKey {
            column: "order_id",
            references: "orders",
            referenced_column: "id",
            on_delete: Some("CASCADE"),
        },
        ForeignKey {
            column: "payment_id",
            references: "payments",
            referenced_column: "id",
            on_delete: Some("SET NULL"),
        },
    ],
    search: None,
    active: None,
    expand: None,
};

pub static ORDER_EVENTS: TableDef = TableDef {
    name: "order_events",
    primary_key: "id",
    columns: &[
        ColumnDef::new("id", ColumnType::Uuid).default_sql("uuid_generate_v4()"),
        ColumnDef::new("order_id", ColumnType::Uuid),
        ColumnDef::new("event_type", ColumnType::Text),
        ColumnDef::new("payload", ColumnType::Jsonb).nullable(),
        ColumnDef::created_at("created_at"),
    ],
    foreign_keys: &[ForeignKey {
        column: "order_id",
        references: "orders",
        referenced_column: "id",
        on_delete: Some("CASCADE"),
    }],
    search: None,
    active: None,
    expand: None,
};

impl Record for Order {
    fn table() -> &'static TableDef {
        &ORDERS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
        }
        if self.version == 0 {
            self.version = 1;
        }
    }
}

impl Record for OrderItem {
    fn table() -> &'static TableDef {
        &ORDER_ITEMS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
