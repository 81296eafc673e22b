//! Versioned schema migrations, applied in order and recorded in `_schema_migrations`.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use std::collections::HashSet;

pub const TRACKING_TABLE: &str = "_schema_migrations";

/// Arbitrary key for the session advisory lock held while migrating.
const LOCK_KEY: i64 = 0x5359_4f50_4d49_4752;

#[derive(Debug)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: &'static str,
    pub applied_at: Option<DateTime<Utc>>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "core tables: customers, items, purchases, purchase_details",
        up: &[
            r#"CREATE TABLE customers (
                customer_id VARCHAR(10) NOT NULL,
                customer_name VARCHAR(100) NOT NULL,
                age INTEGER NOT NULL,
                gender VARCHAR(10) NOT NULL,
                CONSTRAINT pk_customers PRIMARY KEY (customer_id)
            )"#,
            "CREATE INDEX ix_customers_customer_name ON customers (customer_name)",
            r#"CREATE TABLE items (
                item_id VARCHAR(10) NOT NULL,
                item_name VARCHAR(100) NOT NULL,
                price NUMERIC(10, 2) NOT NULL,
                CONSTRAINT pk_items PRIMARY KEY (item_id)
            )"#,
            "CREATE INDEX ix_items_item_name ON items (item_name)",
            r#"CREATE TABLE purchases (
                purchase_id VARCHAR(10) NOT NULL,
                customer_id VARCHAR(10) NOT NULL,
                purchase_date DATE NOT NULL,
                CONSTRAINT pk_purchases PRIMARY KEY (purchase_id),
                CONSTRAINT fk_purchases_customer_id_customers FOREIGN KEY (customer_id)
                    REFERENCES customers (customer_id) ON DELETE CASCADE
            )"#,
            "CREATE INDEX ix_purchases_customer_id ON purchases (customer_id)",
            r#"CREATE TABLE purchase_details (
                detail_id VARCHAR(10) NOT NULL,
                purchase_id VARCHAR(10) NOT NULL,
                item_id VARCHAR(10) NOT NULL,
                quantity INTEGER NOT NULL,
                CONSTRAINT pk_purchase_details PRIMARY KEY (detail_id),
                CONSTRAINT uq_purchase_item UNIQUE (purchase_id, item_id),
                CONSTRAINT fk_purchase_details_purchase_id_purchases FOREIGN KEY (purchase_id)
                    REFERENCES purchases (purchase_id) ON DELETE CASCADE,
                CONSTRAINT fk_purchase_details_item_id_items FOREIGN KEY (item_id)
                    REFERENCES items (item_id) ON DELETE RESTRICT
            )"#,
            "CREATE INDEX ix_purchase_details_purchase_id ON purchase_details (purchase_id)",
            "CREATE INDEX ix_purchase_details_item_id ON purchase_details (item_id)",
        ],
        down: &[
            "DROP TABLE purchase_details",
            "DROP TABLE purchases",
            "DROP TABLE items",
            "DROP TABLE customers",
        ],
    },
    Migration {
        version: 2,
        description: "sample table",
        up: &[r#"CREATE TABLE sample (
                id SERIAL NOT NULL,
                name VARCHAR(100) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CONSTRAINT pk_sample PRIMARY KEY (id)
            )"#],
        down: &["DROP TABLE sample"],
    },
    Migration {
        version: 3,
        description: "items: legacy integer id and created_at",
        up: &[
            "ALTER TABLE items ADD COLUMN id INTEGER",
            "ALTER TABLE items ADD COLUMN created_at TIMESTAMPTZ NOT NULL DEFAULT now()",
        ],
        down: &[
            "ALTER TABLE items DROP COLUMN created_at",
            "ALTER TABLE items DROP COLUMN id",
        ],
    },
];

/// Versions must be positive and strictly increasing.
pub fn check_order(migrations: &[Migration]) -> Result<(), AppError> {
    let mut prev = 0;
    for m in migrations {
        if m.version <= prev {
            return Err(AppError::Migration(format!(
                "version {} is out of order (after {})",
                m.version, prev
            )));
        }
        prev = m.version;
    }
    Ok(())
}

/// Migrations not yet applied, in order.
pub fn pending<'a>(migrations: &'a [Migration], applied: &HashSet<i64>) -> Vec<&'a Migration> {
    migrations.iter().filter(|m| !applied.contains(&m.version)).collect()
}

/// Applied migrations above `target`, newest first.
pub fn to_revert<'a>(migrations: &'a [Migration], applied: &HashSet<i64>, target: i64) -> Vec<&'a Migration> {
    migrations
        .iter()
        .rev()
        .filter(|m| m.version > target && applied.contains(&m.version))
        .collect()
}

/// Apply every pending migration. Idempotent; returns the versions applied.
pub async fn apply_migrations(pool: &PgPool) -> Result<Vec<i64>, AppError> {
    apply(pool, MIGRATIONS).await
}

pub async fn apply(pool: &PgPool, migrations: &[Migration]) -> Result<Vec<i64>, AppError> {
    check_order(migrations)?;
    let mut conn = locked_connection(pool).await?;
    let result = apply_locked(&mut conn, migrations).await;
    unlock(&mut conn).await?;
    result
}

async fn apply_locked(conn: &mut PoolConnection<Postgres>, migrations: &[Migration]) -> Result<Vec<i64>, AppError> {
    let applied = applied_versions(conn).await?;
    let mut done = Vec::new();
    for m in pending(migrations, &applied) {
        let mut tx = sqlx::Connection::begin(&mut **conn).await?;
        for stmt in m.up {
            sqlx::query(stmt).execute(&mut *tx).await.map_err(|e| {
                AppError::Migration(format!("{:04} {}: {}", m.version, m.description, e))
            })?;
        }
        sqlx::query(&format!(
            "INSERT INTO {} (version, description) VALUES ($1, $2)",
            TRACKING_TABLE
        ))
        .bind(m.version)
        .bind(m.description)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(version = m.version, description = m.description, "migration applied");
        done.push(m.version);
    }
    Ok(done)
}

/// Revert applied migrations newer than `target`; returns the versions reverted.
pub async fn revert_to(pool: &PgPool, target: i64) -> Result<Vec<i64>, AppError> {
    check_order(MIGRATIONS)?;
    let mut conn = locked_connection(pool).await?;
    let result = revert_locked(&mut conn, MIGRATIONS, target).await;
    unlock(&mut conn).await?;
    result
}

async fn revert_locked(
    conn: &mut PoolConnection<Postgres>,
    migrations: &[Migration],
    target: i64,
) -> Result<Vec<i64>, AppError> {
    let applied = applied_versions(conn).await?;
    let mut done = Vec::new();
    for m in to_revert(migrations, &applied, target) {
        let mut tx = sqlx::Connection::begin(&mut **conn).await?;
        for stmt in m.down {
            sqlx::query(stmt).execute(&mut *tx).await.map_err(|e| {
                AppError::Migration(format!("revert {:04} {}: {}", m.version, m.description, e))
            })?;
        }
        sqlx::query(&format!("DELETE FROM {} WHERE version = $1", TRACKING_TABLE))
            .bind(m.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version = m.version, description = m.description, "migration reverted");
        done.push(m.version);
    }
    Ok(done)
}

/// Every known migration with its applied time, if any.
pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>, AppError> {
    ensure_tracking_table(pool).await?;
    let rows: Vec<(i64, DateTime<Utc>)> =
        sqlx::query_as(&format!("SELECT version, applied_at FROM {}", TRACKING_TABLE))
            .fetch_all(pool)
            .await?;
    Ok(MIGRATIONS
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description,
            applied_at: rows.iter().find(|(v, _)| *v == m.version).map(|(_, at)| *at),
        })
        .collect())
}

async fn ensure_tracking_table<'e, E>(executor: E) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        TRACKING_TABLE
    );
    sqlx::query(&ddl).execute(executor).await?;
    Ok(())
}

async fn applied_versions(conn: &mut PoolConnection<Postgres>) -> Result<HashSet<i64>, AppError> {
    ensure_tracking_table(&mut **conn).await?;
    let rows: Vec<(i64,)> = sqlx::query_as(&format!("SELECT version FROM {}", TRACKING_TABLE))
        .fetch_all(&mut **conn)
        .await?;
    Ok(rows.into_iter().map(|(v,)| v).collect())
}

async fn locked_connection(pool: &PgPool) -> Result<PoolConnection<Postgres>, AppError> {
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    Ok(conn)
}

async fn unlock(conn: &mut PoolConnection<Postgres>) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(LOCK_KEY)
        .execute(&mut **conn)
        .await?;
    Ok(())
}
