//! Routing, validation and non-database endpoints against a pool that never connects.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{error_code, offline_app, send};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn top_page_returns_message() {
    let (status, body) = send(&offline_app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "shop-api top page!"}));
}

#[tokio::test]
async fn health_and_version_do_not_touch_the_database() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "shop-api");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn database_health_reports_unavailable() {
    let (status, body) = send(&offline_app(), Method::GET, "/health/db", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"db": "unavailable"}));
}

#[tokio::test]
async fn openapi_document_lists_shop_routes() {
    let (status, body) = send(&offline_app(), Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths object");
    for p in ["/", "/customers", "/allcustomers", "/items", "/sample"] {
        assert!(paths.contains_key(p), "missing {}", p);
    }
}

#[tokio::test]
async fn customer_id_is_required_on_read_and_delete() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/customers", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "validation_error");

    let (status, _) = send(&app, Method::GET, "/customers?customer_id=%20%20", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::DELETE, "/customers", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn customer_body_is_validated_before_any_query() {
    let app = offline_app();
    let too_long = json!({"customer_id": "C1234567890", "customer_name": "a", "age": 1, "gender": "M"});
    let (status, body) = send(&app, Method::POST, "/customers", Some(too_long)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "validation_error");

    let blank = json!({"customer_id": "  ", "customer_name": "a", "age": 1, "gender": "M"});
    let (status, _) = send(&app, Method::PUT, "/customers", Some(blank)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let wrong_type = json!({"customer_id": "C1", "customer_name": "a", "age": "old", "gender": "M"});
    let (status, _) = send(&app, Method::POST, "/customers", Some(wrong_type)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn item_price_must_fit_numeric_10_2() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({"item_name": "pen", "price": "123456789.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::POST, "/items", Some(json!({"item_name": "pen", "price": "cheap"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn item_price_that_rounds_past_numeric_10_2_is_rejected() {
    let app = offline_app();
    for price in ["99999999.999", "99999999.995"] {
        let (status, body) = send(&app, Method::POST, "/items", Some(json!({"item_name": "pen", "price": price}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", price);
        assert_eq!(error_code(&body), "validation_error");
    }

    let generic = json!({"item_id": "I1", "item_name": "pen", "price": "99999999.995"});
    let (status, body) = send(&app, Method::POST, "/api/v1/items", Some(generic)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("NUMERIC(10, 2)"));
}

#[tokio::test]
async fn sample_name_length_is_checked() {
    let long = "x".repeat(101);
    let (status, _) = send(&offline_app(), Method::POST, "/sample", Some(json!({"name": long}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_table_is_not_found() {
    let (status, body) = send(&offline_app(), Method::GET, "/api/v1/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
}

#[tokio::test]
async fn primary_keys_are_parsed_per_column_type() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/api/v1/sample/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/customers/ABCDEFGHIJKL", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generic_insert_rejects_bad_bodies() {
    let app = offline_app();
    let unknown = json!({"customer_id": "C1", "customer_name": "a", "age": 1, "gender": "M", "email": "x"});
    let (status, _) = send(&app, Method::POST, "/api/v1/customers", Some(unknown)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let missing = json!({"customer_id": "C1", "customer_name": "a", "gender": "M"});
    let (status, body) = send(&app, Method::POST, "/api/v1/customers", Some(missing)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("age"));

    let (status, _) = send(&app, Method::POST, "/api/v1/customers", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_date = json!({"purchase_id": "P1", "customer_id": "C1", "purchase_date": "2024/01/01"});
    let (status, _) = send(&app, Method::POST, "/api/v1/purchases", Some(bad_date)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn primary_key_cannot_change_on_patch() {
    let (status, body) = send(
        &offline_app(),
        Method::PATCH,
        "/api/v1/customers/C1",
        Some(json!({"customer_id": "C2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("customer_id"));
}

#[tokio::test]
async fn list_filters_and_paging_are_validated() {
    let app = offline_app();
    let (status, _) = send(&app, Method::GET, "/api/v1/customers?nickname=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/customers?limit=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/customers?age=old", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin_with_credentials() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/customers")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let res = offline_app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let req = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let res = offline_app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let payload = vec![b' '; shop_api::routes::BODY_LIMIT_BYTES + 1];
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();
    let res = offline_app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
