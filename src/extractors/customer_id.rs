//! Extract the required `customer_id` query parameter.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

pub const CUSTOMER_ID_PARAM: &str = "customer_id";

/// `?customer_id=...`; missing or blank is a validation error.
#[derive(Clone, Debug)]
pub struct CustomerIdParam(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CustomerIdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        params
            .get(CUSTOMER_ID_PARAM)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(CustomerIdParam)
            .ok_or_else(|| AppError::Validation(format!("{} is required", CUSTOMER_ID_PARAM)))
    }
}
