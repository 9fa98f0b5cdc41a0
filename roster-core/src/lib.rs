//! Roster Core - reviewer assignment for code review
//!
//! This crate owns the rules for who reviews a pull request: automatic
//! assignment on creation, single-reviewer reassignment, idempotent merge,
//! and bulk deactivation that cascades into reviewer substitution.
//! Persistence is reached through the traits in [`directory`].

pub mod assign;
pub mod config;
pub mod deactivate;
pub mod directory;
pub mod error;
pub mod memory;
pub mod models;
pub mod roster;

pub use assign::{AssignmentEngine, Reassignment, ReviewerPicker};
pub use config::{CliOverrides, Config};
pub use deactivate::{DeactivationController, DeactivationReport, SkipReason, SlotOutcome};
pub use directory::{PrStore, Reporting, Store, TeamDirectory, UserDirectory};
pub use error::{Error, ErrorKind, Result};
pub use memory::InMemoryStore;
pub use models::{PrStatus, PullRequest, PullRequestShort, Stats, Team, TeamMember, User};
pub use roster::Roster;
