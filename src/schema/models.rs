//! Typed rows and request bodies for the shop routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Sample {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewSample {
    pub name: String,
}

/// Used both as request body and response row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Customer {
    pub customer_id: String,
    pub customer_name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct DeletedCustomer {
    pub customer_id: String,
    #[schema(value_type = String)]
    pub status: &'static str,
}

/// Item row. `price` is the NUMERIC column rendered as text so no precision is lost.
#[derive(Clone, Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Item {
    pub item_id: String,
    pub item_name: String,
    pub price: String,
    pub id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewItem {
    pub item_name: String,
    #[schema(value_type = String, example = "120.50")]
    pub price: PriceInput,
}

/// A price given either as a JSON number or a decimal string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    pub fn as_text(&self) -> String {
        match self {
            PriceInput::Text(s) => s.trim().to_string(),
            PriceInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SampleListQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_numbers_and_strings() {
        let a: NewItem = serde_json::from_str(r#"{"item_name":"pen","price":120.5}"#).unwrap();
        assert_eq!(a.price.as_text(), "120.5");
        let b: NewItem = serde_json::from_str(r#"{"item_name":"pen","price":" 99.99 "}"#).unwrap();
        assert_eq!(b.price.as_text(), "99.99");
        let c: NewItem = serde_json::from_str(r#"{"item_name":"pen","price":3}"#).unwrap();
        assert_eq!(c.price.as_text(), "3");
    }

    #[test]
    fn price_rejects_other_json_types() {
        assert!(serde_json::from_str::<NewItem>(r#"{"item_name":"pen","price":true}"#).is_err());
    }
}
