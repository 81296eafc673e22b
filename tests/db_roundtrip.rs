//! End-to-end tests against a real PostgreSQL. Skipped unless `TEST_DATABASE_URL` is set.

mod common;

use axum::http::{Method, StatusCode};
use common::{error_code, online_app, send, test_pool, unique_id};
use serde_json::{json, Map, Value};
use shop_api::service::{DeleteOutcome, InsertOutcome, UpdateOutcome};
use shop_api::{Catalog, CrudService};

#[tokio::test]
async fn customer_routes_round_trip() {
    let Some(pool) = test_pool().await else { return };
    let app = online_app(pool);
    let id = unique_id("C");
    let customer = json!({"customer_id": id, "customer_name": "テスト太郎", "age": 25, "gender": "M"});

    let (status, body) = send(&app, Method::POST, "/customers", Some(customer.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, customer);

    let (status, body) = send(&app, Method::POST, "/customers", Some(customer.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"].as_str().unwrap().contains("Customer already exists"));

    let (status, body) = send(&app, Method::GET, &format!("/customers?customer_id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_name"], "テスト太郎");

    let updated = json!({"customer_id": id, "customer_name": "更新後太郎", "age": 26, "gender": "M"});
    let (status, body) = send(&app, Method::PUT, "/customers", Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 26);

    let (status, body) = send(&app, Method::GET, "/allcustomers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|c| c["customer_id"] == id.as_str()));

    let (status, body) = send(&app, Method::DELETE, &format!("/customers?customer_id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"customer_id": id, "status": "deleted"}));

    let (status, body) = send(&app, Method::GET, &format!("/customers?customer_id={}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("Customer not found"));

    let (status, _) = send(&app, Method::DELETE, &format!("/customers?customer_id={}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = json!({"customer_id": id, "customer_name": "誰", "age": 1, "gender": "F"});
    let (status, body) = send(&app, Method::PUT, "/customers", Some(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("Customer not found"));
}

#[tokio::test]
async fn items_get_generated_keys_and_exact_prices() {
    let Some(pool) = test_pool().await else { return };
    let app = online_app(pool);

    let (status, first) = send(&app, Method::POST, "/items", Some(json!({"item_name": "pen", "price": "120.50"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(&app, Method::POST, "/items", Some(json!({"item_name": "ink", "price": 3}))).await;
    assert_eq!(status, StatusCode::OK);

    let first_id = first["item_id"].as_str().unwrap();
    assert!(first_id.starts_with('I') && first_id.len() == 10);
    assert_eq!(first["price"], "120.50");
    assert_eq!(second["price"], "3.00");
    assert!(second["id"].as_i64().unwrap() > first["id"].as_i64().unwrap());

    let (status, tiny) = send(&app, Method::POST, "/items", Some(json!({"item_name": "dust", "price": 0.0000001}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tiny["price"], "0.00");

    let (status, body) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|i| i["item_id"] == first_id));
}

#[tokio::test]
async fn sample_lists_newest_first() {
    let Some(pool) = test_pool().await else { return };
    let app = online_app(pool);
    let name = unique_id("s");
    let (status, created) = send(&app, Method::POST, "/sample", Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].as_i64().is_some());

    let (status, body) = send(&app, Method::GET, "/sample?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sample_limit_defaults_to_50_and_is_clamped() {
    let Some(pool) = test_pool().await else { return };
    sqlx::query("INSERT INTO sample (name) SELECT 'bulk-' || g FROM generate_series(1, 1001) AS g")
        .execute(&pool)
        .await
        .unwrap();
    let app = online_app(pool);

    let (status, body) = send(&app, Method::GET, "/sample", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 50);
    let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));

    let (_, body) = send(&app, Method::GET, "/sample?limit=5000", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1000);

    let (status, body) = send(&app, Method::GET, "/sample?limit=-3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoints_report_the_connected_database() {
    let Some(pool) = test_pool().await else { return };
    let expected: String = sqlx::query_scalar("SELECT current_database()::text")
        .fetch_one(&pool)
        .await
        .unwrap();
    let app = online_app(pool);

    let (status, body) = send(&app, Method::GET, "/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"db": "ok", "database": expected}));

    let (status, body) = send(&app, Method::GET, "/health/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db"], "ok");
    assert_eq!(body["database"], expected.as_str());
    assert!(body["version"].as_str().unwrap().starts_with("PostgreSQL"));
    assert!(!body["user"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn generic_routes_enforce_foreign_keys() {
    let Some(pool) = test_pool().await else { return };
    let app = online_app(pool);
    let customer_id = unique_id("C");
    let item_id = unique_id("I");
    let purchase_id = unique_id("P");
    let detail_id = unique_id("D");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/customers",
        Some(json!({"customer_id": customer_id, "customer_name": "a", "age": "40", "gender": "F"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["age"], 40);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/items",
        Some(json!({"item_id": item_id, "item_name": "cup", "price": "9.99"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/purchases",
        Some(json!({"purchase_id": purchase_id, "customer_id": customer_id, "purchase_date": "2024-05-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let detail = json!({"detail_id": detail_id, "purchase_id": purchase_id, "item_id": item_id, "quantity": 2});
    let (status, _) = send(&app, Method::POST, "/api/v1/purchase_details", Some(detail)).await;
    assert_eq!(status, StatusCode::CREATED);

    // same (purchase_id, item_id) pair under another key
    let dup = json!({"detail_id": unique_id("D"), "purchase_id": purchase_id, "item_id": item_id, "quantity": 1});
    let (status, body) = send(&app, Method::POST, "/api/v1/purchase_details", Some(dup)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "conflict");

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/purchases?customer_id={}", customer_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["purchase_date"], "2024-05-01");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/items/{}", item_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/customers/{}", customer_id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/customers/{}", customer_id),
        Some(json!({"age": 41})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["age"], 41);

    // cascades to purchases and purchase_details
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/customers/{}", customer_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/purchases/{}", purchase_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/items/{}", item_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[tokio::test]
async fn crud_service_reports_outcomes() {
    let Some(pool) = test_pool().await else { return };
    let catalog = Catalog::standard();
    let customers = catalog.table("customers").unwrap();
    let id = unique_id("c");
    let row = values(&[
        ("customer_id", json!(id)),
        ("customer_name", json!("テスト太郎")),
        ("age", json!(25)),
        ("gender", json!("M")),
    ]);

    let inserted = CrudService::insert(&pool, customers, &row).await.unwrap();
    assert!(matches!(inserted, InsertOutcome::Inserted { .. }));
    assert_eq!(inserted.to_string(), format!("inserted:{}", id));
    assert_eq!(
        CrudService::insert(&pool, customers, &row).await.unwrap(),
        InsertOutcome::UniqueViolation
    );

    let found = CrudService::select_one(&pool, customers, &json!(id)).await.unwrap();
    assert_eq!(found.len(), 1);

    let change = values(&[("customer_id", json!(id)), ("age", json!(26))]);
    let updated = CrudService::update(&pool, customers, &change).await.unwrap();
    assert_eq!(updated.to_string(), "updated");

    let missing = values(&[("age", json!(26))]);
    assert_eq!(
        CrudService::update(&pool, customers, &missing).await.unwrap(),
        UpdateOutcome::MissingKey("customer_id")
    );

    let deleted = CrudService::delete(&pool, customers, &json!(id)).await.unwrap();
    assert_eq!(deleted.to_string(), format!("{} is deleted", id));
    assert_eq!(
        CrudService::delete(&pool, customers, &json!(id)).await.unwrap(),
        DeleteOutcome::NotFound
    );
}
