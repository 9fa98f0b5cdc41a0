//! Entry point used by the serving layers.
//!
//! `Roster` wires one storage backend into the assignment engine and the
//! deactivation controller and adds the team/user read and write paths
//! that do not need reviewer selection.

use std::sync::Arc;

use tracing::info;

use crate::assign::{AssignmentEngine, Reassignment, ReviewerPicker};
use crate::deactivate::{DeactivationController, DeactivationReport};
use crate::directory::{PrStore, Reporting, Store, TeamDirectory, UserDirectory};
use crate::models::{PullRequest, PullRequestShort, Stats, Team, User};
use crate::{Error, Result};

#[derive(Clone)]
pub struct Roster {
    users: Arc<dyn UserDirectory>,
    teams: Arc<dyn TeamDirectory>,
    prs: Arc<dyn PrStore>,
    reporting: Arc<dyn Reporting>,
    engine: AssignmentEngine,
    deactivation: DeactivationController,
}

impl Roster {
    /// Build a roster on top of a single backend
    pub fn new<S: Store + 'static>(store: Arc<S>, picker: ReviewerPicker) -> Self {
        let users: Arc<dyn UserDirectory> = store.clone();
        let teams: Arc<dyn TeamDirectory> = store.clone();
        let prs: Arc<dyn PrStore> = store.clone();
        let reporting: Arc<dyn Reporting> = store;

        let engine = AssignmentEngine::new(users.clone(), prs.clone(), picker);
        let deactivation =
            DeactivationController::new(users.clone(), teams.clone(), prs.clone(), engine.clone());

        Self {
            users,
            teams,
            prs,
            reporting,
            engine,
            deactivation,
        }
    }

    pub fn engine(&self) -> &AssignmentEngine {
        &self.engine
    }

    // ── Teams ────────────────────────────────────────────────────────────

    /// Create a team and its members, returning the stored roster
    pub async fn create_team(&self, team: &Team) -> Result<Team> {
        if team.team_name.trim().is_empty() {
            return Err(Error::Validation("team_name must not be empty".to_string()));
        }
        for (i, member) in team.members.iter().enumerate() {
            if member.user_id.trim().is_empty() {
                return Err(Error::Validation("member user_id must not be empty".to_string()));
            }
            if team.members[..i].iter().any(|m| m.user_id == member.user_id) {
                return Err(Error::Validation(format!(
                    "duplicate member {}",
                    member.user_id
                )));
            }
        }

        self.teams.create_team(team).await?;
        info!(team = %team.team_name, members = team.members.len(), "Created team");
        self.get_team(&team.team_name).await
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        self.teams
            .get_team(team_name)
            .await?
            .ok_or_else(|| Error::TeamNotFound(team_name.to_string()))
    }

    // ── Users ────────────────────────────────────────────────────────────

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    /// Toggle a single user's active flag. Existing reviews are left alone.
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self
            .users
            .set_active(user_id, is_active)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        info!(user_id, is_active, "Updated user activity");
        Ok(user)
    }

    /// Every PR the user is assigned to review, newest first
    pub async fn reviews_for_user(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        self.get_user(user_id).await?;
        self.prs.prs_by_reviewer(user_id).await
    }

    pub async fn bulk_deactivate(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<DeactivationReport> {
        self.deactivation.bulk_deactivate(team_name, user_ids).await
    }

    // ── Pull requests ────────────────────────────────────────────────────

    pub async fn create_pr(&self, pr_id: &str, name: &str, author_id: &str) -> Result<PullRequest> {
        self.engine.create_pr(pr_id, name, author_id).await
    }

    pub async fn get_pr(&self, pr_id: &str) -> Result<PullRequest> {
        self.prs
            .get_pr(pr_id)
            .await?
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))
    }

    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest> {
        self.engine.merge_pr(pr_id).await
    }

    pub async fn reassign_reviewer(&self, pr_id: &str, old_user_id: &str) -> Result<Reassignment> {
        self.engine.reassign(pr_id, old_user_id).await
    }

    // ── Reporting ────────────────────────────────────────────────────────

    pub async fn stats(&self) -> Result<Stats> {
        self.reporting.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::models::{PrStatus, TeamMember};

    async fn roster() -> Roster {
        let roster = Roster::new(Arc::new(InMemoryStore::new()), ReviewerPicker::seeded(5));
        roster
            .create_team(&Team::new(
                "backend",
                vec![
                    TeamMember::new("u1", "Alice", true),
                    TeamMember::new("u2", "Bob", true),
                    TeamMember::new("u3", "Carol", true),
                    TeamMember::new("u4", "Dan", true),
                ],
            ))
            .await
            .unwrap();
        roster
    }

    #[tokio::test]
    async fn test_create_team_rejects_bad_input() {
        let roster = roster().await;
        assert!(matches!(
            roster.create_team(&Team::new(" ", vec![])).await.unwrap_err(),
            Error::Validation(_)
        ));
        let dup = Team::new(
            "infra",
            vec![TeamMember::new("i1", "I", true), TeamMember::new("i1", "I", true)],
        );
        assert!(matches!(
            roster.create_team(&dup).await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            roster.create_team(&Team::new("backend", vec![])).await.unwrap_err(),
            Error::TeamExists(_)
        ));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let roster = roster().await;

        let pr = roster.create_pr("p1", "Add search", "u1").await.unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 2);

        let old = pr.assigned_reviewers[0].clone();
        let swapped = roster.reassign_reviewer("p1", &old).await.unwrap();
        assert!(!swapped.pr.has_reviewer(&old));
        assert!(swapped.pr.has_reviewer(&swapped.replaced_by));
        assert_eq!(swapped.pr.assigned_reviewers.len(), 2);

        let reviews = roster.reviews_for_user(&swapped.replaced_by).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].pr_id, "p1");

        let merged = roster.merge_pr("p1").await.unwrap();
        assert_eq!(merged.status, PrStatus::Merged);

        let stats = roster.stats().await.unwrap();
        assert_eq!(stats.total_prs, 1);
        assert_eq!(stats.total_users, 4);
    }

    #[tokio::test]
    async fn test_set_user_active_does_not_reassign() {
        let roster = roster().await;
        let pr = roster.create_pr("p1", "x", "u1").await.unwrap();
        let reviewer = pr.assigned_reviewers[0].clone();

        let user = roster.set_user_active(&reviewer, false).await.unwrap();
        assert!(!user.is_active);
        assert!(roster.get_pr("p1").await.unwrap().has_reviewer(&reviewer));

        assert!(matches!(
            roster.set_user_active("ghost", true).await.unwrap_err(),
            Error::UserNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reviews_for_unknown_user() {
        let roster = roster().await;
        assert!(matches!(
            roster.reviews_for_user("ghost").await.unwrap_err(),
            Error::UserNotFound(_)
        ));
    }
}
