//! End-to-end tests: the full router over the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use oms_viewset::{app, AppState, Backend, ListDefaults, MemoryDatabase};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    app(
        AppState {
            backend: Backend::Memory(MemoryDatabase::new()),
        },
        ListDefaults::default(),
        1024 * 1024,
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, b.len());
            Body::from(b.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let (status, v) = send(app, Method::POST, uri, Some(&body.to_string())).await;
    assert_eq!(status, StatusCode::OK, "POST {} failed: {}", uri, v);
    v
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Product, variant and draft order ready for line items.
async fn seed_order(app: &Router, price_minor: i64) -> (Value, Value, Value) {
    let product = post(app, "/api/v1/products", json!({"title": "Mug"})).await;
    let variant = post(
        app,
        "/api/v1/variants",
        json!({
            "product_id": product["id"],
            "sku": format!("MUG-{}", price_minor),
            "price_minor": price_minor,
            "currency": "EUR"
        }),
    )
    .await;
    let order = post(app, "/api/v1/orders", json!({"currency": "EUR"})).await;
    (product, variant, order)
}

#[tokio::test]
async fn health_reports_success() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": "Service is healthy"}));

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_retrieve_returns_the_same_record() {
    let app = test_app();
    let created = post(
        &app,
        "/api/v1/products",
        json!({"title": "Desk Lamp", "description": "Warm light"}),
    )
    .await;
    assert_eq!(created["is_active"], true);
    assert_eq!(created["created_at"], created["updated_at"]);

    let (status, fetched) = get(&app, &format!("/api/v1/products/{}", created["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_pages_with_total() {
    let app = test_app();
    for i in 0..15 {
        post(&app, "/api/v1/products", json!({"title": format!("Product {}", i)})).await;
    }
    let (status, body) = get(&app, "/api/v1/products?page=2&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"], json!({"page": 2, "limit": 10, "total": 15}));

    // nonsense paging falls back to defaults
    let (_, body) = get(&app, "/api/v1/products?page=0&limit=abc").await;
    assert_eq!(body["pagination"], json!({"page": 1, "limit": 10, "total": 15}));
    assert_eq!(body["data"][0]["title"], "Product 14");
}

#[tokio::test]
async fn search_and_active_filters() {
    let app = test_app();
    post(&app, "/api/v1/products", json!({"title": "Desk Lamp"})).await;
    post(
        &app,
        "/api/v1/products",
        json!({"title": "Chair", "description": "Pairs with a LAMP"}),
    )
    .await;
    post(&app, "/api/v1/products", json!({"title": "Rug", "is_active": false})).await;

    let (_, body) = get(&app, "/api/v1/products?search=lamp").await;
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = get(&app, "/api/v1/products?active=false").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "Rug");

    let (_, body) = get(&app, "/api/v1/products?active=TRUE&search=chair").await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = get(&app, "/api/v1/products?search=").await;
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn include_variants_expands_products() {
    let app = test_app();
    let product = post(&app, "/api/v1/products", json!({"title": "Lamp"})).await;
    let variant = post(
        &app,
        "/api/v1/variants",
        json!({
            "product_id": product["id"],
            "sku": "LAMP-RED",
            "attributes": {"color": "red"},
            "price_minor": 1999,
            "currency": "USD"
        }),
    )
    .await;
    assert_eq!(variant["attributes"]["color"], "red");

    let (_, body) = get(&app, "/api/v1/products?include_variants=true").await;
    let variants = body["data"][0]["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0]["sku"], "LAMP-RED");

    let (_, body) = get(&app, "/api/v1/products").await;
    assert!(body["data"][0].get("variants").is_none());
}

#[tokio::test]
async fn update_merges_and_keeps_the_id() {
    let app = test_app();
    let created = post(
        &app,
        "/api/v1/products",
        json!({"title": "Old", "description": "keep me"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let body = json!({"id": "00000000-0000-0000-0000-000000000001", "title": "New"}).to_string();
    let (status, updated) = send(&app, Method::PATCH, &format!("/api/v1/products/{}", id), Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "New");
    assert_eq!(updated["description"], "keep me");
    assert_eq!(updated["created_at"], created["created_at"]);
}

#[tokio::test]
async fn error_statuses_and_bodies() {
    let app = test_app();

    let (status, body) = get(&app, "/api/v1/products/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_argument");
    assert_eq!(body["error"]["message"], "Invalid ID");

    let missing = "7f1c0e7e-7a43-4bb0-a6a2-1b6f6f1d0a11";
    let (status, body) = get(&app, &format!("/api/v1/products/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Object not found");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/products/{}", missing),
        Some(r#"{"title":"x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(r#"{"title":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("title is required"));

    let (status, _) = send(&app, Method::POST, "/api/v1/products", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/variants",
        Some(r#"{"sku":"A","price_minor":-5,"currency":"USD"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_filters_are_internal_errors() {
    let app = test_app();
    post(&app, "/api/v1/orders", json!({"currency": "USD"})).await;
    let (status, body) = get(&app, "/api/v1/orders?search=x").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "internal");
    assert_eq!(body["error"]["message"], "Unable to fetch objects");
}

#[tokio::test]
async fn duplicate_sku_fails_to_create() {
    let app = test_app();
    let product = post(&app, "/api/v1/products", json!({"title": "Lamp"})).await;
    let variant = json!({"product_id": product["id"], "sku": "DUP", "price_minor": 1, "currency": "USD"});
    post(&app, "/api/v1/variants", variant.clone()).await;
    let (status, body) = send(&app, Method::POST, "/api/v1/variants", Some(&variant.to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Unable to create object");
}

#[tokio::test]
async fn orders_start_as_draft() {
    let app = test_app();
    let order = post(&app, "/api/v1/orders", json!({"currency": "USD", "status": "paid"})).await;
    assert_eq!(order["status"], "draft");
    assert_eq!(order["version"], 1);
    assert!(order["customer_id"].is_null());
}

#[tokio::test]
async fn order_items_are_priced_from_their_variant() {
    let app = test_app();
    let (_, variant, order) = seed_order(&app, 450).await;
    let item = post(
        &app,
        "/api/v1/orders/items",
        json!({"order_id": order["id"], "variant_id": variant["id"], "quantity": 3}),
    )
    .await;
    assert_eq!(item["unit_price_minor"], 450);
    assert_eq!(item["currency"], "EUR");
    assert_eq!(item["line_total_minor"], 1350);

    let body = json!({"order_id": order["id"], "variant_id": variant["id"], "quantity": 5}).to_string();
    let uri = format!("/api/v1/orders/items/{}", item["id"].as_str().unwrap());
    let (status, updated) = send(&app, Method::PATCH, &uri, Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 5);

    let (_, listed) = get(&app, "/api/v1/orders/items").await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn order_item_with_unknown_variant_is_rejected_by_the_hook() {
    let app = test_app();
    let (_, _, order) = seed_order(&app, 100).await;
    let body = json!({
        "order_id": order["id"],
        "variant_id": "7f1c0e7e-7a43-4bb0-a6a2-1b6f6f1d0a11",
        "quantity": 1
    })
    .to_string();
    let (status, body) = send(&app, Method::POST, "/api/v1/orders/items", Some(&body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Unable to prepare object");

    let (_, listed) = get(&app, "/api/v1/orders/items").await;
    assert_eq!(listed["pagination"]["total"], 0);
}

#[tokio::test]
async fn delete_order_item_then_not_found() {
    let app = test_app();
    let (_, variant, order) = seed_order(&app, 200).await;
    let item = post(
        &app,
        "/api/v1/orders/items",
        json!({"order_id": order["id"], "variant_id": variant["id"], "quantity": 1}),
    )
    .await;
    let uri = format!("/api/v1/orders/items/{}", item["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Object deleted"}));

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_wired_operations_are_routed() {
    let app = test_app();
    let (_, variant, order) = seed_order(&app, 300).await;
    let item = post(
        &app,
        "/api/v1/orders/items",
        json!({"order_id": order["id"], "variant_id": variant["id"], "quantity": 1}),
    )
    .await;

    // order items have no retrieve; products have no delete
    let (status, _) = get(&app, &format!("/api/v1/orders/items/{}", item["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/products/{}", variant["product_id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    // the literal items segment wins over the order id parameter
    let (status, body) = get(&app, &format!("/api/v1/orders/{}", order["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], order["id"]);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = oms_viewset::app(
        AppState {
            backend: Backend::Memory(MemoryDatabase::new()),
        },
        ListDefaults::default(),
        64,
    );
    let big = json!({"title": "x".repeat(200)}).to_string();
    let (status, _) = send(&app, Method::POST, "/api/v1/products", Some(&big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn repeated_and_unknown_query_keys_do_not_fail_a_list() {
    let app = test_app();
    for i in 0..3 {
        post(&app, "/api/v1/products", json!({"title": format!("Product {}", i)})).await;
    }
    let (status, body) = get(&app, "/api/v1/products?page=1&page=2&limit=2&sort=title").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn configured_body_limit_replaces_the_framework_default() {
    let app = oms_viewset::app(
        AppState {
            backend: Backend::Memory(MemoryDatabase::new()),
        },
        ListDefaults::default(),
        8 * 1024 * 1024,
    );
    let big = json!({"title": "x".repeat(3 * 1024 * 1024)}).to_string();
    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(&big)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"].as_str().unwrap().len(), 3 * 1024 * 1024);
}

#[tokio::test]
async fn padded_ids_are_invalid() {
    let app = test_app();
    let created = post(&app, "/api/v1/products", json!({"title": "Lamp"})).await;
    let uri = format!("/api/v1/products/%20{}", created["id"].as_str().unwrap());
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid ID");
}
