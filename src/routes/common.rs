//! Common routes: top page, health, database health, version, OpenAPI document.

use crate::handlers::{docs, health};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/health/db", get(health::health_db))
        .route("/health/info", get(health::health_info))
        .route("/version", get(health::version))
        .route("/openapi.json", get(docs::openapi))
        .with_state(state)
}
