//! Connection pool setup, database bootstrap and server introspection queries.

use crate::error::AppError;
use crate::settings::DatabaseSettings;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::time::Duration;
use utoipa::ToSchema;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool sized and recycled per settings; connections are checked before use.
pub fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(0)
        .max_lifetime(settings.max_lifetime)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .test_before_acquire(true)
}

pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, AppError> {
    let opts = settings.connect_options()?;
    let pool = pool_options(settings).connect_with(opts).await?;
    Ok(pool)
}

/// Pool that opens connections on first use. Never fails on an unreachable server.
pub fn connect_lazy(settings: &DatabaseSettings) -> Result<PgPool, AppError> {
    let opts = settings.connect_options()?;
    Ok(pool_options(settings).connect_lazy_with(opts))
}

/// Create the target database through the `postgres` maintenance database if it is missing.
pub async fn ensure_database_exists(opts: &PgConnectOptions) -> Result<(), AppError> {
    let Some(db_name) = opts.get_database().map(str::to_string) else {
        return Ok(());
    };
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let mut conn = opts.clone().database("postgres").connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn current_database(pool: &PgPool) -> Result<String, sqlx::Error> {
    sqlx::query_scalar("SELECT current_database()::text").fetch_one(pool).await
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ServerInfo {
    pub version: String,
    pub database: String,
    pub user: String,
}

pub async fn server_info(pool: &PgPool) -> Result<ServerInfo, sqlx::Error> {
    sqlx::query_as("SELECT version() AS version, current_database()::text AS database, current_user::text AS \"user\"")
        .fetch_one(pool)
        .await
}
