//! Order-management records and their table definitions.

pub mod catalog;
pub mod customer;
pub mod enums;
pub mod orders;

pub use catalog::{Product, ProductVariant, INVENTORY, PRODUCTS, PRODUCT_VARIANTS};
pub use customer::CUSTOMERS;
pub use enums::{OrderStatus, ENUM_TYPES};
pub use orders::{Order, OrderItem, ORDERS, ORDER_EVENTS, ORDER_ITEMS, PAYMENTS, REFUNDS};

use crate::schema::TableDef;

/// Every table, parents before children.
pub static TABLES: &[&TableDef] = &[
    &PRODUCTS,
    &PRODUCT_VARIANTS,
    &INVENTORY,
    &CUSTOMERS,
    &ORDERS,
    &ORDER_ITEMS,
    &PAYMENTS,
    &REFUNDS,
    &ORDER_EVENTS,
];

/// Secondary indexes created at bootstrap.
pub static INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
    "CREATE INDEX IF NOT EXISTS idx_payments_order ON payments(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_open ON orders(status) WHERE status IN ('pending_payment','paid','fulfillment_in_progress')",
    "CREATE INDEX IF NOT EXISTS idx_product_variants_sku ON product_variants(sku)",
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_events_order ON order_events(order_id)",
];
