//! Typed queries behind the shop routes (sample, customers, items).

use crate::error::{is_integrity_violation, AppError};
use crate::schema::{Customer, Item, NewItem, Sample};
use sqlx::PgPool;

/// Page size for `GET /sample` when no limit is given.
pub const DEFAULT_SAMPLE_LIMIT: i64 = 50;

const CUSTOMER_COLUMNS: &str = "customer_id, customer_name, age, gender";
const ITEM_COLUMNS: &str = "item_id, item_name, price::text AS price, id, created_at";

pub struct ShopService;

impl ShopService {
    pub async fn create_sample(pool: &PgPool, name: &str) -> Result<Sample, AppError> {
        let row = sqlx::query_as("INSERT INTO sample (name) VALUES ($1) RETURNING id, name, created_at")
            .bind(name)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    /// Newest first. `limit` is clamped to 0..=1000.
    pub async fn list_samples(pool: &PgPool, limit: Option<i64>) -> Result<Vec<Sample>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_SAMPLE_LIMIT).clamp(0, i64::from(crate::sql::MAX_LIMIT));
        let rows = sqlx::query_as("SELECT id, name, created_at FROM sample ORDER BY id DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_customer(pool: &PgPool, c: &Customer) -> Result<Customer, AppError> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query_as(&format!(
            "INSERT INTO customers ({0}) VALUES ($1, $2, $3, $4) RETURNING {0}",
            CUSTOMER_COLUMNS
        ))
        .bind(&c.customer_id)
        .bind(&c.customer_name)
        .bind(c.age)
        .bind(&c.gender)
        .fetch_one(&mut *tx)
        .await;
        match result {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            }
            Err(e) if is_integrity_violation(&e) => {
                tx.rollback().await?;
                tracing::warn!(customer_id = %c.customer_id, "duplicate customer");
                Err(AppError::Conflict("Customer already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_customer(pool: &PgPool, customer_id: &str) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE customer_id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn list_customers(pool: &PgPool) -> Result<Vec<Customer>, AppError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {} FROM customers ORDER BY customer_id",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Replace every non-key field. None when the customer does not exist.
    pub async fn update_customer(pool: &PgPool, c: &Customer) -> Result<Option<Customer>, AppError> {
        let mut tx = pool.begin().await?;
        let row = sqlx::query_as(&format!(
            "UPDATE customers SET customer_name = $2, age = $3, gender = $4 WHERE customer_id = $1 RETURNING {}",
            CUSTOMER_COLUMNS
        ))
        .bind(&c.customer_id)
        .bind(&c.customer_name)
        .bind(c.age)
        .bind(&c.gender)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Delete a customer (purchases cascade). Returns false when absent.
    pub async fn delete_customer(pool: &PgPool, customer_id: &str) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    pub async fn list_items(pool: &PgPool) -> Result<Vec<Item>, AppError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {} FROM items ORDER BY created_at DESC, item_id",
            ITEM_COLUMNS
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Insert an item with a generated `item_id` and the next legacy `id`.
    /// The table is locked for the transaction so concurrent creates get distinct ids.
    pub async fn create_item(pool: &PgPool, item: &NewItem) -> Result<Item, AppError> {
        let mut tx = pool.begin().await?;
        sqlx::query("LOCK TABLE items IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let next_id: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM items")
            .fetch_one(&mut *tx)
            .await?;
        let item_id = new_item_id();
        let row: Item = sqlx::query_as(&format!(
            "INSERT INTO items (item_id, item_name, price, id) VALUES ($1, $2, $3::numeric, $4) RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(&item_id)
        .bind(&item.item_name)
        .bind(item.price.as_text())
        .bind(next_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(item_id = %row.item_id, id = next_id, "item created");
        Ok(row)
    }
}

/// `I` followed by nine upper-case hex digits from a random UUID (10 chars total).
pub fn new_item_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("I{}", hex[..9].to_uppercase())
}
