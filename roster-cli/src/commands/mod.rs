//! CLI command implementations

pub mod pr;
pub mod serve;
pub mod stats;
pub mod team;
pub mod user;

use std::sync::Arc;

use roster_core::{Config, ReviewerPicker, Roster};
use roster_db::Database;
use serde::Serialize;

pub use pr::PrArgs;
pub use serve::ServeArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

/// Settings shared by every command
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub json: bool,
    pub verbose: bool,
}

impl Context {
    /// Open the configured database and wrap it in a `Roster`
    pub async fn roster(&self) -> anyhow::Result<Roster> {
        let db = Database::from_settings(&self.config.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

        if self.verbose {
            eprintln!("Using database {}", self.config.database.path.display());
        }

        Ok(Roster::new(
            Arc::new(db),
            ReviewerPicker::from_seed(self.config.assignment.seed),
        ))
    }

    /// Print `value` as JSON when `--json` is set, otherwise run `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}
