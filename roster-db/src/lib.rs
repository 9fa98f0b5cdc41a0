//! Database layer for Roster
//!
//! SQLite persistence for teams, users and pull requests. [`Database`]
//! implements every storage trait from `roster_core::directory`, so it can be
//! handed straight to `roster_core::Roster`.

pub mod error;
pub mod repos;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

use roster_core::config::DatabaseSettings;

pub use error::{Error, Result};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `db_path` with default pool settings
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(db_path.as_ref(), DatabaseSettings::default().max_connections).await
    }

    /// Open the database described by the `[database]` config section
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        Self::connect(&settings.path, settings.max_connections).await
    }

    async fn connect(db_path: &Path, max_connections: u32) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;

        debug!(path = %db_path.display(), "Opened database");
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
