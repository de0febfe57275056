//! Status enums stored as PostgreSQL enum types.

use crate::schema::EnumDef;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Draft,
    PendingPayment,
    Paid,
    FulfillmentInProgress,
    Shipped,
    Completed,
    Cancelled,
}

pub static ORDER_STATUS: EnumDef = EnumDef {
    name: "order_status",
    values: &[
        "draft",
        "pending_payment",
        "paid",
        "fulfillment_in_progress",
        "shipped",
        "completed",
        "cancelled",
    ],
};

pub static PAYMENT_STATUS: EnumDef = EnumDef {
    name: "payment_status",
    values: &["pending", "authorized", "captured", "failed", "refunded", "partial_refunded"],
};

pub static REFUND_STATUS: EnumDef = EnumDef {
    name: "refund_status",
    values: &["pending", "approved", "rejected", "processed"],
};

pub static ENUM_TYPES: &[&EnumDef] = &[&ORDER_STATUS, &PAYMENT_STATUS, &REFUND_STATUS];
