//! Smoke-test table: create and list.

use crate::error::AppError;
use crate::handlers::validate_fields;
use crate::schema::{NewSample, Sample, SampleListQuery};
use crate::service::ShopService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::json;

#[utoipa::path(post, path = "/sample", request_body = NewSample, responses((status = 200, body = Sample)))]
pub async fn create_sample(
    State(state): State<AppState>,
    Json(payload): Json<NewSample>,
) -> Result<Json<Sample>, AppError> {
    validate_fields(&state, "sample", &[("name", json!(payload.name))])?;
    let row = ShopService::create_sample(&state.pool, &payload.name).await?;
    Ok(Json(row))
}

#[utoipa::path(
    get,
    path = "/sample",
    params(("limit" = Option<i64>, Query, description = "Max rows, newest first (default 50)")),
    responses((status = 200, body = Vec<Sample>))
)]
pub async fn list_sample(
    State(state): State<AppState>,
    Query(q): Query<SampleListQuery>,
) -> Result<Json<Vec<Sample>>, AppError> {
    let rows = ShopService::list_samples(&state.pool, q.limit).await?;
    Ok(Json(rows))
}
