//! Error types for the HTTP layer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use roster_core::ErrorKind;

/// Result type for server startup
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the server from running
#[derive(Error, Debug)]
pub enum Error {
    /// Could not bind the listen address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server loop exited with an IO error
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

// ── Response errors ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Wrapper to make `roster_core::Error` usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub roster_core::Error);

impl ApiErr {
    /// Request rejected before it reached the engine
    pub fn invalid(message: impl Into<String>) -> Self {
        Self(roster_core::Error::Validation(message.into()))
    }

    fn code(&self) -> &'static str {
        use roster_core::Error as E;
        match &self.0 {
            E::TeamExists(_) => "TEAM_EXISTS",
            E::AlreadyExists(_) => "PR_EXISTS",
            E::PrMerged(_) => "PR_MERGED",
            E::NotAssigned { .. } => "NOT_ASSIGNED",
            E::NoCandidate { .. } => "NO_CANDIDATE",
            E::ReviewerTaken { .. } => "REVIEWER_TAKEN",
            E::Validation(_) => "INVALID_INPUT",
            e if e.is_not_found() => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (
            status,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    code: self.code(),
                    message: self.0.to_string(),
                },
            }),
        )
            .into_response()
    }
}

impl From<roster_core::Error> for ApiErr {
    fn from(err: roster_core::Error) -> Self {
        Self(err)
    }
}
