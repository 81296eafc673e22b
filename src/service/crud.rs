//! Generic CRUD execution against PostgreSQL.

use crate::error::{is_integrity_violation, AppError};
use crate::schema::{ColumnType, TableDef};
use crate::service::outcome::{DeleteOutcome, InsertOutcome, UpdateOutcome};
use crate::sql::{self, bind_all, QueryBuf};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

/// Default page size for `list`.
pub const DEFAULT_LIMIT: u32 = 100;

pub struct CrudService;

impl CrudService {
    /// Rows whose primary key equals `pk` (zero or one element).
    pub async fn select_one(pool: &PgPool, table: &TableDef, pk: &Value) -> Result<Vec<Value>, AppError> {
        let q = sql::select_by_pk(table, pk.clone());
        Self::query_many(pool, table, &q).await
    }

    /// Every row of the table, ordered by primary key.
    pub async fn select_all(pool: &PgPool, table: &TableDef) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(table, &[], None, None);
        Self::query_many(pool, table, &q).await
    }

    /// Exact-match filtered page; limit defaults to 100 and is capped at 1000.
    pub async fn list(
        pool: &PgPool,
        table: &TableDef,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(sql::MAX_LIMIT);
        let q = sql::select_list(table, filters, Some(limit), Some(offset.unwrap_or(0)));
        Self::query_many(pool, table, &q).await
    }

    /// Insert one row. Integrity violations roll back and yield `UniqueViolation`.
    pub async fn insert(pool: &PgPool, table: &TableDef, values: &Map<String, Value>) -> Result<InsertOutcome, AppError> {
        let q = sql::insert(table, values);
        match Self::write_one(pool, table, &q).await? {
            Written::Row(row) => {
                let pk = row.get(table.primary_key).cloned().unwrap_or(Value::Null);
                Ok(InsertOutcome::Inserted { pk, row })
            }
            // INSERT ... RETURNING always yields a row on success
            Written::Nothing => Err(AppError::Db(sqlx::Error::RowNotFound)),
            Written::Violation => Ok(InsertOutcome::UniqueViolation),
        }
    }

    /// Update by the primary key found in `values`; the remaining keys are the columns to set.
    pub async fn update(pool: &PgPool, table: &TableDef, values: &Map<String, Value>) -> Result<UpdateOutcome, AppError> {
        let pk = match values.get(table.primary_key) {
            None | Some(Value::Null) => return Ok(UpdateOutcome::MissingKey(table.primary_key)),
            Some(v) => v.clone(),
        };
        let Some(q) = sql::update(table, pk, values) else {
            return Ok(UpdateOutcome::NoChanges);
        };
        Ok(match Self::write_one(pool, table, &q).await? {
            Written::Row(row) => UpdateOutcome::Updated(row),
            Written::Nothing => UpdateOutcome::NotFound,
            Written::Violation => UpdateOutcome::UniqueViolation,
        })
    }

    /// Delete by primary key.
    pub async fn delete(pool: &PgPool, table: &TableDef, pk: &Value) -> Result<DeleteOutcome, AppError> {
        let q = sql::delete(table, pk.clone());
        Ok(match Self::write_one(pool, table, &q).await? {
            Written::Row(_) => DeleteOutcome::Deleted(pk.clone()),
            Written::Nothing => DeleteOutcome::NotFound,
            Written::Violation => DeleteOutcome::UniqueViolation,
        })
    }

    async fn query_many(pool: &PgPool, table: &TableDef, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(pool).await?;
        rows.iter()
            .map(|r| row_to_json(r, table).map_err(AppError::Db))
            .collect()
    }

    /// Run one write statement in its own transaction.
    async fn write_one(pool: &PgPool, table: &TableDef, q: &QueryBuf) -> Result<Written, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "write");
        let mut tx = pool.begin().await?;
        let result = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&mut *tx)
            .await;
        match result {
            Ok(row) => {
                let row = row.map(|r| row_to_json(&r, table)).transpose()?;
                tx.commit().await?;
                Ok(row.map(Written::Row).unwrap_or(Written::Nothing))
            }
            Err(e) if is_integrity_violation(&e) => {
                tracing::warn!(table = table.name, error = %e, "integrity violation, rolled back");
                tx.rollback().await?;
                Ok(Written::Violation)
            }
            Err(e) => Err(e.into()),
        }
    }
}

enum Written {
    Row(Value),
    Nothing,
    Violation,
}

/// Decode a row using the declared column types.
pub fn row_to_json(row: &PgRow, table: &TableDef) -> Result<Value, sqlx::Error> {
    use sqlx::{Column, Row};
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        let ty = table.column(name).map(|c| c.ty);
        let v = match ty {
            Some(ColumnType::Serial | ColumnType::Integer) => {
                row.try_get::<Option<i32>, _>(name)?.map(|n| Value::Number(n.into()))
            }
            Some(ColumnType::Date) => row
                .try_get::<Option<chrono::NaiveDate>, _>(name)?
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
            Some(ColumnType::Timestamptz) => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
                .map(|d| Value::String(d.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))),
            // numeric is selected as text
            Some(ColumnType::Varchar(_) | ColumnType::Numeric { .. }) | None => {
                row.try_get::<Option<String>, _>(name)?.map(Value::String)
            }
        };
        map.insert(name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(Value::Object(map))
}
