//! Customer CRUD keyed by `customer_id` in the body or query string.

use crate::error::AppError;
use crate::extractors::CustomerIdParam;
use crate::handlers::validate_fields;
use crate::schema::{Customer, DeletedCustomer};
use crate::service::ShopService;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::json;

const NOT_FOUND: &str = "Customer not found";

fn validate(state: &AppState, c: &Customer) -> Result<(), AppError> {
    validate_fields(
        state,
        "customers",
        &[
            ("customer_id", json!(c.customer_id)),
            ("customer_name", json!(c.customer_name)),
            ("age", json!(c.age)),
            ("gender", json!(c.gender)),
        ],
    )?;
    if c.customer_id.trim().is_empty() {
        return Err(AppError::Validation("customer_id must not be empty".into()));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/customers",
    request_body = Customer,
    responses((status = 200, body = Customer), (status = 409, description = "Customer already exists"))
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, AppError> {
    validate(&state, &customer)?;
    let row = ShopService::create_customer(&state.pool, &customer).await?;
    Ok(Json(row))
}

#[utoipa::path(
    get,
    path = "/customers",
    params(("customer_id" = String, Query)),
    responses((status = 200, body = Customer), (status = 404, description = "Customer not found"))
)]
pub async fn read_one_customer(
    State(state): State<AppState>,
    CustomerIdParam(customer_id): CustomerIdParam,
) -> Result<Json<Customer>, AppError> {
    let row = ShopService::get_customer(&state.pool, &customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(row))
}

#[utoipa::path(get, path = "/allcustomers", responses((status = 200, body = Vec<Customer>)))]
pub async fn read_all_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, AppError> {
    let rows = ShopService::list_customers(&state.pool).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/customers",
    request_body = Customer,
    responses((status = 200, body = Customer), (status = 404, description = "Customer not found"))
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, AppError> {
    validate(&state, &customer)?;
    let row = ShopService::update_customer(&state.pool, &customer)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/customers",
    params(("customer_id" = String, Query)),
    responses((status = 200, body = DeletedCustomer), (status = 404, description = "Customer not found"))
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    CustomerIdParam(customer_id): CustomerIdParam,
) -> Result<Json<DeletedCustomer>, AppError> {
    if !ShopService::delete_customer(&state.pool, &customer_id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    Ok(Json(DeletedCustomer {
        customer_id,
        status: "deleted",
    }))
}
