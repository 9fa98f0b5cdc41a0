//! `/team/*` routes

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use roster_core::Team;

use super::{json_body, query_params, require};
use crate::error::ApiErr;
use crate::AppState;

#[derive(Deserialize)]
struct TeamQuery {
    team_name: String,
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
}

async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let team = json_body(payload)?;
    require("team_name", &team.team_name)?;

    let team = state.roster.create_team(&team).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

async fn get_team(
    State(state): State<AppState>,
    params: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let params = query_params(params)?;
    require("team_name", &params.team_name)?;

    Ok(Json(state.roster.get_team(&params.team_name).await?))
}
