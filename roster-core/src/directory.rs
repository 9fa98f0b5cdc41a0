//! Storage abstractions consumed by the assignment engine.
//!
//! The engine never talks to a database directly. It reads users and teams
//! and writes reviewer sets through these traits, so the same logic runs
//! against the in-memory store in tests and against SQLite in production.

use async_trait::async_trait;

use crate::models::{PullRequest, PullRequestShort, Stats, Team, User};
use crate::Result;

/// Lookup and activation of users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Get a user, returning None if the id is unknown.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Active users of `team_name`, minus any id in `exclude`.
    ///
    /// Results are ordered by user id so seeded selection is reproducible.
    async fn active_users_by_team(&self, team_name: &str, exclude: &[String])
        -> Result<Vec<User>>;

    /// Set the active flag on a single user and return the updated record.
    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>>;

    /// Set the active flag on every listed user in one write.
    async fn bulk_set_active(&self, user_ids: &[String], is_active: bool) -> Result<()>;
}

/// Team rosters
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn team_exists(&self, team_name: &str) -> Result<bool>;

    /// Get a team with its members, returning None if it does not exist.
    async fn get_team(&self, team_name: &str) -> Result<Option<Team>>;

    /// Create a team and upsert its members onto it.
    ///
    /// Fails with `Error::TeamExists` if the team is already present.
    async fn create_team(&self, team: &Team) -> Result<()>;
}

/// Pull request persistence
#[async_trait]
pub trait PrStore: Send + Sync {
    async fn pr_exists(&self, pr_id: &str) -> Result<bool>;

    /// Get a pull request with its reviewers, returning None if unknown.
    async fn get_pr(&self, pr_id: &str) -> Result<Option<PullRequest>>;

    /// Persist a new pull request and its reviewers.
    ///
    /// Fails with `Error::AlreadyExists` if the id is taken.
    async fn create_pr(&self, pr: &PullRequest) -> Result<()>;

    /// Atomically replace `old` with `new` on an open PR.
    ///
    /// The open-status and membership checks happen in the same atomic step
    /// as the write. Fails with `Error::PrNotFound`, `Error::PrMerged`,
    /// `Error::NotAssigned` or `Error::ReviewerTaken` when the PR no longer
    /// permits the swap.
    async fn replace_reviewer(&self, pr_id: &str, old: &str, new: &str) -> Result<()>;

    /// Mark a pull request merged. Already-merged PRs are returned unchanged.
    async fn merge_pr(&self, pr_id: &str) -> Result<Option<PullRequest>>;

    /// Open PRs where any of `user_ids` is a reviewer.
    async fn open_prs_by_reviewers(&self, user_ids: &[String]) -> Result<Vec<PullRequest>>;

    /// Every PR the user reviews, newest first.
    async fn prs_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>>;
}

/// Read-only aggregate reporting
#[async_trait]
pub trait Reporting: Send + Sync {
    async fn stats(&self) -> Result<Stats>;
}

/// A backend that provides every collaborator the engine needs
pub trait Store: UserDirectory + TeamDirectory + PrStore + Reporting {}

impl<T> Store for T where T: UserDirectory + TeamDirectory + PrStore + Reporting {}
