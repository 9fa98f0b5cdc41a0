//! Roster Server - HTTP API for reviewer assignment
//!
//! Exposes team, user and pull request operations from `roster_core` as JSON
//! endpoints. Domain errors map to a `{"error": {"code", "message"}}` body.

mod error;
mod routes;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use roster_core::config::ServerSettings;
use roster_core::Roster;

pub use error::{ApiErr, Error, Result};

/// Shared state for the axum routes
#[derive(Clone)]
pub struct AppState {
    pub roster: Roster,
}

/// Build the full application router
pub fn router(roster: Roster, request_timeout: Duration) -> Router {
    routes::api_routes()
        .with_state(AppState { roster })
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Bind `settings.host:settings.port` and serve until Ctrl-C
pub async fn serve(roster: Roster, settings: &ServerSettings) -> Result<()> {
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(%addr, "Roster server listening");

    axum::serve(listener, router(roster, settings.request_timeout))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Roster server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use roster_core::{InMemoryStore, ReviewerPicker};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let roster = Roster::new(Arc::new(InMemoryStore::new()), ReviewerPicker::seeded(3));
        router(roster, Duration::from_secs(5))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed_team(app: &Router) {
        let (status, _) = send(
            app,
            "POST",
            "/team/add",
            Some(json!({
                "team_name": "backend",
                "members": [
                    {"user_id": "u1", "username": "Alice", "is_active": true},
                    {"user_id": "u2", "username": "Bob", "is_active": true},
                    {"user_id": "u3", "username": "Carol", "is_active": true},
                    {"user_id": "u4", "username": "Dan", "is_active": true}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_team_add_and_get() {
        let app = app();
        seed_team(&app).await;

        let (status, body) = send(&app, "GET", "/team/get?team_name=backend", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["members"].as_array().unwrap().len(), 4);

        let (status, body) = send(
            &app,
            "POST",
            "/team/add",
            Some(json!({"team_name": "backend", "members": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "TEAM_EXISTS");

        let (status, body) = send(&app, "GET", "/team/get?team_name=nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_pr_lifecycle() {
        let app = app();
        seed_team(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/create",
            Some(json!({
                "pull_request_id": "p1",
                "pull_request_name": "Add search",
                "author_id": "u1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["pr"]["status"], "OPEN");
        let reviewers = body["pr"]["assigned_reviewers"].as_array().unwrap().clone();
        assert_eq!(reviewers.len(), 2);
        assert!(!reviewers.contains(&json!("u1")));

        let old = reviewers[0].as_str().unwrap().to_string();
        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/reassign",
            Some(json!({"pull_request_id": "p1", "old_user_id": old})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let replaced_by = body["replaced_by"].as_str().unwrap();
        assert_ne!(replaced_by, old);
        assert_ne!(replaced_by, "u1");

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/merge",
            Some(json!({"pull_request_id": "p1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pr"]["status"], "MERGED");

        // Merge again is idempotent
        let (status, _) = send(
            &app,
            "POST",
            "/pullRequest/merge",
            Some(json!({"pull_request_id": "p1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/reassign",
            Some(json!({"pull_request_id": "p1", "old_user_id": replaced_by})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PR_MERGED");

        let (status, body) = send(
            &app,
            "GET",
            &format!("/users/getReview?user_id={}", replaced_by),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pull_requests"][0]["pull_request_id"], "p1");
    }

    #[tokio::test]
    async fn test_create_pr_conflicts_and_validation() {
        let app = app();
        seed_team(&app).await;
        let create = json!({
            "pull_request_id": "p1",
            "pull_request_name": "x",
            "author_id": "u1"
        });

        send(&app, "POST", "/pullRequest/create", Some(create.clone())).await;
        let (status, body) = send(&app, "POST", "/pullRequest/create", Some(create)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PR_EXISTS");

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/create",
            Some(json!({"pull_request_id": "", "pull_request_name": "x", "author_id": "u1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/create",
            Some(json!({"pull_request_id": "p2"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");

        let (status, body) = send(
            &app,
            "POST",
            "/pullRequest/create",
            Some(json!({"pull_request_id": "p3", "pull_request_name": "x", "author_id": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bulk_deactivate_report() {
        let app = app();
        seed_team(&app).await;

        let (_, body) = send(
            &app,
            "POST",
            "/pullRequest/create",
            Some(json!({"pull_request_id": "p1", "pull_request_name": "x", "author_id": "u1"})),
        )
        .await;
        let gone = body["pr"]["assigned_reviewers"][0].clone();

        let (status, body) = send(
            &app,
            "POST",
            "/users/bulkDeactivate",
            Some(json!({"team_name": "backend", "user_ids": [gone]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deactivated_users"], json!([gone]));
        assert_eq!(body["slots"][0]["pr_id"], "p1");
        assert_eq!(body["slots"][0]["outcome"], "reassigned");

        let (status, body) = send(
            &app,
            "POST",
            "/users/bulkDeactivate",
            Some(json!({"team_name": "backend", "user_ids": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_set_is_active_and_stats() {
        let app = app();
        seed_team(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/users/setIsActive",
            Some(json!({"user_id": "u2", "is_active": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["is_active"], false);

        let (status, body) = send(&app, "GET", "/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_users"], 4);
        assert_eq!(body["total_prs"], 0);
    }
}
