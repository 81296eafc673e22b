//! Convert serde_json::Value into text parameters for sqlx.
//!
//! Every placeholder the builder emits carries an explicit cast (`$1::integer`),
//! so values travel as text and PostgreSQL parses them into the column type.

use serde_json::Value;

/// Text form of a JSON value for binding. `None` binds SQL NULL.
pub fn bind_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(v.to_string()),
    }
}

/// Bind each param of a built query in order.
pub fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    params: &[Value],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for p in params {
        query = query.bind(bind_text(p));
    }
    query
}
