//! `/pullRequest/*` routes

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};

use roster_core::{PullRequest, Reassignment};

use super::{json_body, require};
use crate::error::ApiErr;
use crate::AppState;

#[derive(Deserialize)]
struct CreatePrRequest {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
}

#[derive(Deserialize)]
struct MergePrRequest {
    pull_request_id: String,
}

#[derive(Deserialize)]
struct ReassignRequest {
    pull_request_id: String,
    old_user_id: String,
}

#[derive(Serialize)]
struct PrResponse {
    pr: PullRequest,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create_pr))
        .route("/pullRequest/merge", post(merge_pr))
        .route("/pullRequest/reassign", post(reassign))
}

async fn create_pr(
    State(state): State<AppState>,
    payload: Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrResponse>), ApiErr> {
    let req = json_body(payload)?;
    require("pull_request_id", &req.pull_request_id)?;
    require("pull_request_name", &req.pull_request_name)?;
    require("author_id", &req.author_id)?;

    let pr = state
        .roster
        .create_pr(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PrResponse { pr })))
}

async fn merge_pr(
    State(state): State<AppState>,
    payload: Result<Json<MergePrRequest>, JsonRejection>,
) -> Result<Json<PrResponse>, ApiErr> {
    let req = json_body(payload)?;
    require("pull_request_id", &req.pull_request_id)?;

    let pr = state.roster.merge_pr(&req.pull_request_id).await?;
    Ok(Json(PrResponse { pr }))
}

async fn reassign(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let req = json_body(payload)?;
    require("pull_request_id", &req.pull_request_id)?;
    require("old_user_id", &req.old_user_id)?;

    let reassignment = state
        .roster
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(reassignment))
}
