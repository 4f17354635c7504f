#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the `/api/products` routes.
//!
//! A real axum `Router` is assembled with `build_app` over an in-memory table
//! and driven with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use products_gateway::{build_app, AppState, GatewayConfig, MemoryTable};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn config(extra: &[(&str, &str)]) -> GatewayConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("BACKEND_URL".to_string(), "https://project.supabase.co".to_string()),
        ("BACKEND_KEY".to_string(), "anon".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    GatewayConfig::from_lookup(|k| vars.get(k).cloned()).unwrap()
}

fn app_with(table: Arc<MemoryTable>, extra: &[(&str, &str)]) -> Router {
    let config = config(extra);
    let state = AppState::from_config(table, &config).unwrap();
    build_app(state, &config)
}

fn app(table: Arc<MemoryTable>) -> Router {
    app_with(table, &[])
}

fn widget() -> Value {
    json!({
        "title": "Widget",
        "description": "A widget",
        "ean_code": "1234567890123",
        "price": 9.99,
        "dimensions": {"length": 10},
        "weight": {"value": 1},
        "status": "active"
    })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn error_fields(body: &Value) -> Vec<&str> {
    body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn list_on_empty_store_returns_empty_array() {
    let (status, body) = send(app(Arc::new(MemoryTable::new())), Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_returns_record_with_assigned_id() {
    let table = Arc::new(MemoryTable::new());
    let (status, body) = send(app(table.clone()), Method::POST, "/api/products", Some(widget())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["title"], "Widget");
    assert_eq!(body["description"], "A widget");
    assert_eq!(body["ean_code"], "1234567890123");
    assert_eq!(body["price"], json!(9.99));
    assert_eq!(body["dimensions"], json!({"length": 10}));
    assert_eq!(body["weight"], json!({"value": 1}));
    assert_eq!(body["status"], "active");
    assert_eq!(table.calls(), 1);
}

#[tokio::test]
async fn created_record_shows_up_in_list() {
    let table = Arc::new(MemoryTable::new());
    let (_, created) = send(app(table.clone()), Method::POST, "/api/products", Some(widget())).await;

    let (status, list) = send(app(table), Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], created["id"]);
    for field in [
        "title",
        "description",
        "ean_code",
        "price",
        "dimensions",
        "weight",
        "status",
    ] {
        assert_eq!(rows[0][field], widget()[field], "{field} changed");
    }
}

#[tokio::test]
async fn create_without_price_is_rejected_before_backend() {
    let table = Arc::new(MemoryTable::new());
    let mut body = widget();
    body.as_object_mut().unwrap().remove("price");

    let (status, err) = send(app(table.clone()), Method::POST, "/api/products", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error"]["code"], "validation_error");
    assert_eq!(error_fields(&err), vec!["price"]);
    assert_eq!(table.calls(), 0);
    assert!(table.rows("products").is_empty());
}

#[tokio::test]
async fn every_missing_required_field_is_reported_for_update() {
    let table = Arc::new(MemoryTable::new());
    let (status, err) = send(
        app(table.clone()),
        Method::PUT,
        "/api/products/some-id",
        Some(json!({"asin": "B000TEST"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_fields(&err),
        vec!["title", "description", "ean_code", "price", "dimensions", "weight", "status"]
    );
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let table = Arc::new(MemoryTable::new());
    let response = app(table.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let table = Arc::new(MemoryTable::new());
    let mut first = widget();
    first["asin"] = json!("B000TEST");
    first["images"] = json!(["https://img.example/1.png"]);
    let (_, created) = send(app(table.clone()), Method::POST, "/api/products", Some(first)).await;
    let id = created["id"].as_str().unwrap();

    let mut replacement = widget();
    replacement["title"] = json!("Widget v2");
    replacement["price"] = json!(12.5);
    let (status, updated) = send(
        app(table.clone()),
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(replacement),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Widget v2");
    assert_eq!(updated["price"], json!(12.5));
    assert!(updated["asin"].is_null());
    assert!(updated["images"].is_null());

    let stored = &table.rows("products")[0];
    assert!(stored["asin"].is_null());
}

#[tokio::test]
async fn update_of_unknown_id_fails_without_fabricating_a_record() {
    let table = Arc::new(MemoryTable::new());
    let (status, err) = send(
        app(table.clone()),
        Method::PUT,
        "/api/products/nonexistent-id",
        Some(widget()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"]["code"], "not_found");
    assert!(table.rows("products").is_empty());
}

// Delete reports success whether or not a row matched, unlike update above.
#[tokio::test]
async fn delete_of_unknown_id_still_acknowledges() {
    let table = Arc::new(MemoryTable::new());
    let (status, body) = send(
        app(table.clone()),
        Method::DELETE,
        "/api/products/nonexistent-id",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Product deleted successfully"}));
    assert_eq!(table.calls(), 1);
}

#[tokio::test]
async fn delete_removes_the_row() {
    let table = Arc::new(MemoryTable::new());
    let (_, created) = send(app(table.clone()), Method::POST, "/api/products", Some(widget())).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        app(table.clone()),
        Method::DELETE,
        &format!("/api/products/{id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");
    assert!(table.rows("products").is_empty());
}

#[tokio::test]
async fn strict_delete_reports_missing_row() {
    let table = Arc::new(MemoryTable::new());
    let (status, _) = send(
        app_with(table, &[("STRICT_DELETE", "true")]),
        Method::DELETE,
        "/api/products/nonexistent-id",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let table = Arc::new(MemoryTable::new());
    let mut body = widget();
    body["description"] = json!("x".repeat(512));
    // No content-length header, so the limit trips while the body is read.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app_with(table.clone(), &[("BODY_LIMIT_BYTES", "256")])
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(err["error"]["code"], "payload_too_large");
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn backend_failure_surfaces_its_message() {
    let table = Arc::new(MemoryTable::new());
    table.fail_with(Some("connection to server was lost"));

    let (status, err) = send(app(table.clone()), Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["error"]["code"], "backend_error");
    assert_eq!(err["error"]["message"], "connection to server was lost");

    let (status, err) = send(
        app_with(table, &[("EXPOSE_BACKEND_ERRORS", "false")]),
        Method::POST,
        "/api/products",
        Some(widget()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["error"]["message"], "backend request failed");
}

#[tokio::test]
async fn opt_in_rules_apply_to_writes() {
    let table = Arc::new(MemoryTable::new());
    let mut body = widget();
    body["ean_code"] = json!("12345");
    let (status, err) = send(
        app_with(table.clone(), &[("EAN_PATTERN", r"^\d{13}$")]),
        Method::POST,
        "/api/products",
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&err), vec!["ean_code"]);
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn cors_is_off_unless_configured() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/products")
            .header(header::ORIGIN, "https://shop.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app(Arc::new(MemoryTable::new()))
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let response = app_with(Arc::new(MemoryTable::new()), &[("CORS_ALLOW_ORIGINS", "*")])
        .oneshot(preflight())
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let response = app_with(
        Arc::new(MemoryTable::new()),
        &[("CORS_ALLOW_ORIGINS", "https://shop.example")],
    )
    .oneshot(preflight())
    .await
    .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://shop.example"
    );
}

#[tokio::test]
async fn health_and_version() {
    let (status, body) = send(app(Arc::new(MemoryTable::new())), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(app(Arc::new(MemoryTable::new())), Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "products-gateway");
}
