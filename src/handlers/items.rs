//! Item listing and creation with generated keys.

use crate::error::AppError;
use crate::handlers::validate_fields;
use crate::schema::{Item, NewItem};
use crate::service::ShopService;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

#[utoipa::path(get, path = "/items", responses((status = 200, body = Vec<Item>)))]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let rows = ShopService::list_items(&state.pool).await?;
    Ok(Json(rows))
}

#[utoipa::path(post, path = "/items", request_body = NewItem, responses((status = 200, body = Item)))]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItem>,
) -> Result<Json<Item>, AppError> {
    validate_fields(
        &state,
        "items",
        &[
            ("item_name", json!(payload.item_name)),
            ("price", Value::String(payload.price.as_text())),
        ],
    )?;
    let row = ShopService::create_item(&state.pool, &payload).await?;
    Ok(Json(row))
}
