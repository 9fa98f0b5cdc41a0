//! `/users/*` routes

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use roster_core::{DeactivationReport, PullRequestShort, User};

use super::{json_body, query_params, require};
use crate::error::ApiErr;
use crate::AppState;

#[derive(Deserialize)]
struct SetIsActiveRequest {
    user_id: String,
    is_active: bool,
}

#[derive(Serialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
struct ReviewQuery {
    user_id: String,
}

#[derive(Serialize)]
struct ReviewResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

#[derive(Deserialize)]
struct BulkDeactivateRequest {
    team_name: String,
    user_ids: Vec<String>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/users/bulkDeactivate", post(bulk_deactivate))
}

async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let req = json_body(payload)?;
    require("user_id", &req.user_id)?;

    let user = state.roster.set_user_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserResponse { user }))
}

async fn get_review(
    State(state): State<AppState>,
    params: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let params = query_params(params)?;
    require("user_id", &params.user_id)?;

    let pull_requests = state.roster.reviews_for_user(&params.user_id).await?;
    Ok(Json(ReviewResponse {
        user_id: params.user_id,
        pull_requests,
    }))
}

async fn bulk_deactivate(
    State(state): State<AppState>,
    payload: Result<Json<BulkDeactivateRequest>, JsonRejection>,
) -> Result<Json<DeactivationReport>, ApiErr> {
    let req = json_body(payload)?;
    require("team_name", &req.team_name)?;
    for id in &req.user_ids {
        require("user_ids[]", id)?;
    }

    let report = state
        .roster
        .bulk_deactivate(&req.team_name, &req.user_ids)
        .await?;
    Ok(Json(report))
}
