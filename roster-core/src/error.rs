//! Error types for Roster

use thiserror::Error;

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// A pull request with this id already exists
    #[error("PR {0} already exists")]
    AlreadyExists(String),

    /// A team with this name already exists
    #[error("Team {0} already exists")]
    TeamExists(String),

    /// Pull request lookup failed
    #[error("PR {0} not found")]
    PrNotFound(String),

    /// User lookup failed
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Team lookup failed
    #[error("Team {0} not found")]
    TeamNotFound(String),

    /// The author of a new PR does not exist
    #[error("Author {0} not found")]
    AuthorNotFound(String),

    /// Reviewer mutation attempted on a merged PR
    #[error("PR {0} is merged")]
    PrMerged(String),

    /// The user is not a reviewer on the PR
    #[error("User {user_id} is not assigned to PR {pr_id}")]
    NotAssigned { pr_id: String, user_id: String },

    /// No active user is eligible to replace the reviewer
    #[error("No active replacement candidate for {user_id} on PR {pr_id}")]
    NoCandidate { pr_id: String, user_id: String },

    /// The chosen replacement already reviews the PR
    #[error("User {user_id} is already a reviewer on PR {pr_id}")]
    ReviewerTaken { pr_id: String, user_id: String },

    /// Malformed or inconsistent input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by serving layers to pick a response category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation was refused and state is unchanged
    Conflict,
    /// A referenced entity does not exist
    NotFound,
    /// The request itself is malformed
    Invalid,
    /// Something failed underneath the engine
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyExists(_)
            | Error::PrMerged(_)
            | Error::NotAssigned { .. }
            | Error::NoCandidate { .. }
            | Error::ReviewerTaken { .. } => ErrorKind::Conflict,
            Error::PrNotFound(_)
            | Error::UserNotFound(_)
            | Error::TeamNotFound(_)
            | Error::AuthorNotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) | Error::TeamExists(_) => ErrorKind::Invalid,
            Error::Store(_) | Error::Io(_) | Error::Config(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error means some referenced entity is missing
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
