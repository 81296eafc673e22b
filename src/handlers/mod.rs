//! HTTP handlers: health, shop routes, and generic table CRUD.

pub mod customers;
pub mod docs;
pub mod entity;
pub mod health;
pub mod items;
pub mod sample;

use crate::error::AppError;
use crate::service::check_value;
use crate::state::AppState;
use serde_json::Value;

/// Check typed request fields against the catalog columns they are stored in.
pub(crate) fn validate_fields(state: &AppState, table: &str, fields: &[(&str, Value)]) -> Result<(), AppError> {
    let table = state
        .catalog
        .table(table)
        .ok_or_else(|| AppError::NotFound(format!("table {}", table)))?;
    for (name, value) in fields {
        let col = table
            .column(name)
            .ok_or_else(|| AppError::Validation(format!("unknown column {}.{}", table.name, name)))?;
        check_value(col, value)?;
    }
    Ok(())
}
