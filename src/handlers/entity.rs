//! Generic table handlers under `/api/v1`: list, create, read, update, delete.

use crate::error::AppError;
use crate::response::{success_created, success_many, success_one};
use crate::schema::TableDef;
use crate::service::{CrudService, DeleteOutcome, InsertOutcome, RequestValidator, UpdateOutcome};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn lookup_table<'a>(state: &'a AppState, name: &str) -> Result<&'a TableDef, AppError> {
    state
        .catalog
        .table(name)
        .ok_or_else(|| AppError::NotFound(format!("table {}", name)))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn parse_page_param(name: &str, v: &str) -> Result<u32, AppError> {
    v.parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer", name)))
}

pub async fn list(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let table = lookup_table(&state, &table_name)?;

    let mut limit: Option<u32> = None;
    let mut offset: Option<u32> = None;
    let mut filters: Vec<(String, Value)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = Some(parse_page_param("limit", &v)?),
            "offset" => offset = Some(parse_page_param("offset", &v)?),
            _ => filters.push((k, Value::String(v))),
        }
    }
    // HashMap order is arbitrary; keep the generated SQL stable
    filters.sort_by(|a, b| a.0.cmp(&b.0));
    RequestValidator::validate_filters(table, &filters)?;

    let rows = CrudService::list(&state.pool, table, &filters, limit, offset).await?;
    Ok(success_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let table = lookup_table(&state, &table_name)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_insert(table, &body)?;
    match CrudService::insert(&state.pool, table, &body).await? {
        InsertOutcome::Inserted { row, .. } => Ok(success_created(row)),
        other @ InsertOutcome::UniqueViolation => Err(AppError::Conflict(other.to_string())),
    }
}

pub async fn read(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let table = lookup_table(&state, &table_name)?;
    let pk = RequestValidator::parse_key(table, &id)?;
    let row = CrudService::select_one(&state.pool, table, &pk)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(success_one(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let table = lookup_table(&state, &table_name)?;
    let pk = RequestValidator::parse_key(table, &id)?;
    let mut body = body_to_map(body)?;
    RequestValidator::validate_update(table, &body)?;
    if let Some(given) = body.get(table.primary_key) {
        if RequestValidator::parse_key(table, &key_text(given))? != pk {
            return Err(AppError::BadRequest(format!("{} cannot be changed", table.primary_key)));
        }
    }
    body.insert(table.primary_key.to_string(), pk);
    match CrudService::update(&state.pool, table, &body).await? {
        UpdateOutcome::Updated(row) => Ok(success_one(row)),
        UpdateOutcome::NotFound => Err(AppError::NotFound(id)),
        other @ UpdateOutcome::UniqueViolation => Err(AppError::Conflict(other.to_string())),
        other @ (UpdateOutcome::NoChanges | UpdateOutcome::MissingKey(_)) => {
            Err(AppError::BadRequest(other.to_string()))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path((table_name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let table = lookup_table(&state, &table_name)?;
    let pk = RequestValidator::parse_key(table, &id)?;
    match CrudService::delete(&state.pool, table, &pk).await? {
        DeleteOutcome::Deleted(_) => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(AppError::NotFound(id)),
        DeleteOutcome::UniqueViolation => Err(AppError::Conflict(format!(
            "{} {} is referenced by other rows",
            table.name, id
        ))),
    }
}

fn key_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
