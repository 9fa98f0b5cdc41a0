//! Route table and shared request helpers

mod pull_requests;
mod reports;
mod teams;
mod users;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::Router;

use crate::error::ApiErr;
use crate::AppState;

/// Build every API route on top of `AppState`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(teams::routes())
        .merge(users::routes())
        .merge(pull_requests::routes())
        .merge(reports::routes())
}

/// Unwrap a JSON body, turning axum's rejection into an `INVALID_INPUT` error
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiErr> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiErr::invalid(rejection.body_text()))
}

/// Unwrap query parameters the same way as [`json_body`]
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiErr> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| ApiErr::invalid(rejection.body_text()))
}

/// Reject blank required fields before they reach the engine
fn require(field: &str, value: &str) -> Result<(), ApiErr> {
    if value.trim().is_empty() {
        return Err(ApiErr::invalid(format!("{} is required", field)));
    }
    Ok(())
}
