//! Product and variant resources.

use crate::config::ListDefaults;
use crate::domain::{Product, ProductVariant};
use crate::store::Backend;
use crate::viewset::{Operation, ViewSet};
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects the nil UUID a missing or zeroed id deserializes to.
pub(crate) fn not_nil(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("not_nil").with_message("must be a non-nil UUID".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VariantRequest {
    #[serde(default)]
    #[validate(custom(function = "not_nil"))]
    pub product_id: Uuid,
    #[serde(default)]
    #[validate(length(min = 1, message = "sku is required"))]
    pub sku: String,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
    #[serde(default)]
    #[validate(range(min = 0, message = "price_minor must not be negative"))]
    pub price_minor: i64,
    #[serde(default)]
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn product_from_create(req: ProductRequest) -> Product {
    Product {
        title: req.title,
        description: req.description,
        is_active: req.is_active.unwrap_or(true),
        ..Product::default()
    }
}

// An absent flag stays false, the zero value, and is left out of the merge.
fn product_from_update(req: ProductRequest) -> Product {
    Product {
        title: req.title,
        description: req.description,
        is_active: req.is_active.unwrap_or_default(),
        ..Product::default()
    }
}

fn variant_from_create(req: VariantRequest) -> ProductVariant {
    ProductVariant {
        is_active: req.is_active.unwrap_or(true),
        ..variant_from_update(req)
    }
}

fn variant_from_update(req: VariantRequest) -> ProductVariant {
    ProductVariant {
        product_id: req.product_id,
        sku: req.sku,
        attributes: req.attributes,
        price_minor: req.price_minor,
        currency: req.currency,
        is_active: req.is_active.unwrap_or_default(),
        ..ProductVariant::default()
    }
}

const CATALOG_OPS: &[Operation] = &[
    Operation::List,
    Operation::Create,
    Operation::Retrieve,
    Operation::Update,
];

/// `/products` and `/variants`.
pub fn catalog_routes(backend: &Backend, list: ListDefaults) -> Router {
    let products = ViewSet::new(backend.store::<Product>(), product_from_create, product_from_update)
        .with_list_defaults(list)
        .into_router("/products", CATALOG_OPS);
    let variants = ViewSet::new(
        backend.store::<ProductVariant>(),
        variant_from_create,
        variant_from_update,
    )
    .with_list_defaults(list)
    .into_router("/variants", CATALOG_OPS);
    products.merge(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_active_and_update_leaves_it_zero() {
        let req = || ProductRequest {
            title: "Lamp".into(),
            description: None,
            is_active: None,
        };
        assert!(product_from_create(req()).is_active);
        assert!(!product_from_update(req()).is_active);
    }

    #[test]
    fn variant_rules() {
        let ok: VariantRequest = serde_json::from_value(json!({
            "product_id": Uuid::new_v4(),
            "sku": "LAMP-RED",
            "price_minor": 1999,
            "currency": "USD",
            "attributes": {"color": "red"}
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert!(variant_from_create(ok).is_active);

        let bad: VariantRequest = serde_json::from_value(json!({
            "sku": "",
            "price_minor": -1,
            "currency": "US"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["product_id", "sku", "price_minor", "currency"] {
            assert!(fields.contains_key(field), "{} should fail", field);
        }
    }

    #[test]
    fn free_variants_are_allowed() {
        let free: VariantRequest = serde_json::from_value(json!({
            "product_id": Uuid::new_v4(),
            "sku": "GIFT-WRAP",
            "price_minor": 0,
            "currency": "USD"
        }))
        .unwrap();
        assert!(free.validate().is_ok());
    }
}
