//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Stored data that does not map onto the domain model
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A domain rule refused the write
    #[error(transparent)]
    Domain(#[from] roster_core::Error),
}

impl Error {
    /// True when the underlying SQLite error is a primary key or UNIQUE clash
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<Error> for roster_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Domain(inner) => inner,
            other => roster_core::Error::Store(other.to_string()),
        }
    }
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;
