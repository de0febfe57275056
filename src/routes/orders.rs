//! Order and order-item resources.

use super::catalog::not_nil;
use crate::config::ListDefaults;
use crate::domain::{Order, OrderItem, OrderStatus, ProductVariant};
use crate::error::HookError;
use crate::store::{Backend, RecordStore};
use crate::viewset::{Operation, PerformCreate, RequestContext, ViewSet};
use async_trait::async_trait;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct OrderRequest {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: String,
    /// Accepted but never applied; status changes go through dedicated flows.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderItemRequest {
    #[serde(default)]
    #[validate(custom(function = "not_nil"))]
    pub order_id: Uuid,
    #[serde(default)]
    #[validate(custom(function = "not_nil"))]
    pub variant_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

fn order_from_request(req: OrderRequest) -> Order {
    Order {
        customer_id: req.customer_id,
        currency: req.currency,
        status: OrderStatus::Draft,
        ..Order::default()
    }
}

fn item_from_request(req: OrderItemRequest) -> OrderItem {
    OrderItem {
        order_id: req.order_id,
        variant_id: req.variant_id,
        quantity: req.quantity,
        ..OrderItem::default()
    }
}

/// Prices a new line from its variant: unit price, currency and line total.
pub struct OrderItemPricing {
    variants: Arc<dyn RecordStore<ProductVariant>>,
}

impl OrderItemPricing {
    pub fn new(variants: Arc<dyn RecordStore<ProductVariant>>) -> Self {
        OrderItemPricing { variants }
    }
}

#[async_trait]
impl PerformCreate<OrderItem> for OrderItemPricing {
    async fn perform_create(&self, _ctx: &RequestContext, item: &mut OrderItem) -> Result<(), HookError> {
        let variant = self
            .variants
            .find_by_id(item.variant_id)
            .await?
            .ok_or_else(|| HookError::Rejected(format!("variant {} not found", item.variant_id)))?;
        let total = item
            .quantity
            .checked_mul(variant.price_minor)
            .ok_or_else(|| HookError::Rejected("line total overflows".into()))?;
        item.unit_price_minor = variant.price_minor;
        item.currency = variant.currency;
        item.line_total_minor = total;
        Ok(())
    }
}

/// `/orders` and `/orders/items`.
pub fn order_routes(backend: &Backend, list: ListDefaults) -> Router {
    let orders = ViewSet::new(backend.store::<Order>(), order_from_request, order_from_request)
        .with_list_defaults(list)
        .into_router(
            "/orders",
            &[Operation::List, Operation::Create, Operation::Retrieve, Operation::Update],
        );
    let items = ViewSet::new(backend.store::<OrderItem>(), item_from_request, item_from_request)
        .with_perform_create(Arc::new(OrderItemPricing::new(backend.store::<ProductVariant>())))
        .with_list_defaults(list)
        .into_router(
            "/orders/items",
            &[Operation::List, Operation::Create, Operation::Update, Operation::Delete],
        );
    orders.merge(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDatabase;

    #[test]
    fn requested_status_is_ignored() {
        let order = order_from_request(OrderRequest {
            customer_id: None,
            currency: "EUR".into(),
            status: Some("paid".into()),
        });
        assert_eq!(order.status, OrderStatus::Draft);
    }

    #[tokio::test]
    async fn pricing_copies_variant_price_and_currency() {
        let backend = Backend::Memory(MemoryDatabase::new());
        let variants = backend.store::<ProductVariant>();
        let variant = variants
            .insert(ProductVariant {
                product_id: Uuid::new_v4(),
                sku: "MUG-1".into(),
                price_minor: 450,
                currency: "EUR".into(),
                ..ProductVariant::default()
            })
            .await
            .unwrap();
        let pricing = OrderItemPricing::new(variants);

        let mut item = OrderItem {
            variant_id: variant.id,
            quantity: 3,
            ..OrderItem::default()
        };
        pricing.perform_create(&RequestContext::default(), &mut item).await.unwrap();
        assert_eq!(item.unit_price_minor, 450);
        assert_eq!(item.currency, "EUR");
        assert_eq!(item.line_total_minor, 1350);

        let mut orphan = OrderItem {
            variant_id: Uuid::new_v4(),
            quantity: 1,
            ..OrderItem::default()
        };
        let err = pricing.perform_create(&RequestContext::default(), &mut orphan).await.unwrap_err();
        assert!(matches!(err, HookError::Rejected(_)));
    }
}
