//! Top page, liveness, database health and version.

use crate::state::AppState;
use crate::store;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct Message {
    #[schema(value_type = String)]
    pub message: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct HealthBody {
    #[schema(value_type = String)]
    pub status: &'static str,
}

#[derive(Serialize, ToSchema)]
pub struct DbHealth {
    #[schema(value_type = String)]
    pub db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DbInfo {
    #[schema(value_type = String)]
    pub db: &'static str,
    pub version: String,
    pub database: String,
    pub user: String,
}

fn unavailable(err: sqlx::Error) -> (StatusCode, Json<DbHealth>) {
    tracing::warn!(error = %err, "database health check failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(DbHealth {
            db: "unavailable",
            database: None,
        }),
    )
}

#[utoipa::path(get, path = "/", responses((status = 200, body = Message)))]
pub async fn index() -> Json<Message> {
    Json(Message {
        message: "shop-api top page!",
    })
}

#[utoipa::path(get, path = "/health", responses((status = 200, body = HealthBody)))]
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

#[utoipa::path(
    get,
    path = "/health/db",
    responses((status = 200, body = DbHealth), (status = 503, body = DbHealth))
)]
pub async fn health_db(State(state): State<AppState>) -> Result<Json<DbHealth>, (StatusCode, Json<DbHealth>)> {
    store::ping(&state.pool).await.map_err(unavailable)?;
    let database = store::current_database(&state.pool).await.map_err(unavailable)?;
    Ok(Json(DbHealth {
        db: "ok",
        database: Some(database),
    }))
}

#[utoipa::path(
    get,
    path = "/health/info",
    responses((status = 200, body = DbInfo), (status = 503, body = DbHealth))
)]
pub async fn health_info(State(state): State<AppState>) -> Result<Json<DbInfo>, (StatusCode, Json<DbHealth>)> {
    let info = store::server_info(&state.pool).await.map_err(unavailable)?;
    Ok(Json(DbInfo {
        db: "ok",
        version: info.version,
        database: info.database,
        user: info.user,
    }))
}

pub async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
