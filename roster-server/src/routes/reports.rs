//! Read-only reporting and liveness routes

use axum::extract::{Json, State};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use roster_core::Stats;

use crate::error::ApiErr;
use crate::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/health", get(health))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiErr> {
    Ok(Json(state.roster.stats().await?))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
