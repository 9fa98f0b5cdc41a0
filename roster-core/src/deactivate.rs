//! Bulk deactivation with cascading reviewer substitution.
//!
//! Validation is all-or-nothing and happens before any write. Once the
//! deactivation write succeeds the call succeeds; backfilling the reviewer
//! slots the deactivated users held is best-effort and every slot's outcome
//! is recorded in the returned [`DeactivationReport`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::assign::{AssignmentEngine, Exclusions};
use crate::directory::{PrStore, TeamDirectory, UserDirectory};
use crate::{Error, Result};

/// Why a reviewer slot was left pointing at a deactivated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The deactivated reviewer's own record could not be read
    ReviewerUnresolved,
    /// Nobody on the reviewer's team is eligible
    NoCandidate,
    /// The swap was rejected by the store
    WriteFailed(String),
}

/// What happened to one reviewer slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SlotOutcome {
    Reassigned { new_reviewer: String },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub pr_id: String,
    pub old_reviewer: String,
    #[serde(flatten)]
    pub outcome: SlotOutcome,
}

/// Result of a bulk deactivation
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeactivationReport {
    pub team_name: String,
    pub deactivated_users: Vec<String>,
    pub slots: Vec<SlotReport>,
}

impl DeactivationReport {
    pub fn reassigned_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.outcome, SlotOutcome::Reassigned { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.slots.len() - self.reassigned_count()
    }
}

/// Drives bulk deactivation on top of the assignment engine
#[derive(Clone)]
pub struct DeactivationController {
    users: Arc<dyn UserDirectory>,
    teams: Arc<dyn TeamDirectory>,
    prs: Arc<dyn PrStore>,
    engine: AssignmentEngine,
}

impl DeactivationController {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        teams: Arc<dyn TeamDirectory>,
        prs: Arc<dyn PrStore>,
        engine: AssignmentEngine,
    ) -> Self {
        Self {
            users,
            teams,
            prs,
            engine,
        }
    }

    /// Deactivate `user_ids` on `team_name` and backfill their open reviews.
    pub async fn bulk_deactivate(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<DeactivationReport> {
        let user_ids = self.validate(team_name, user_ids).await?;

        // Snapshot before the write so PRs are found by their current reviewers
        let open_prs = self.prs.open_prs_by_reviewers(&user_ids).await?;

        self.users.bulk_set_active(&user_ids, false).await?;
        info!(
            team = team_name,
            users = ?user_ids,
            open_prs = open_prs.len(),
            "Deactivated users"
        );

        let batch = Exclusions::new().with_all(&user_ids);
        let mut slots = Vec::new();

        for mut pr in open_prs {
            let targets: Vec<String> = pr
                .assigned_reviewers
                .iter()
                .filter(|r| batch.contains(r))
                .cloned()
                .collect();

            for old_reviewer in targets {
                // Current reviewers include replacements made earlier in this loop
                let exclusions = batch
                    .clone()
                    .with(&pr.author_id)
                    .with_all(&pr.assigned_reviewers);
                let outcome = match self
                    .engine
                    .replace_reviewer(&pr, &old_reviewer, &exclusions)
                    .await
                {
                    Ok(new_reviewer) => {
                        pr.swap_reviewer(&old_reviewer, &new_reviewer);
                        SlotOutcome::Reassigned { new_reviewer }
                    }
                    Err(e) => {
                        let reason = match e {
                            Error::UserNotFound(_) => SkipReason::ReviewerUnresolved,
                            Error::NoCandidate { .. } => SkipReason::NoCandidate,
                            other => SkipReason::WriteFailed(other.to_string()),
                        };
                        warn!(
                            pr_id = %pr.pr_id,
                            reviewer = %old_reviewer,
                            ?reason,
                            "Left reviewer slot on deactivated user"
                        );
                        SlotOutcome::Skipped(reason)
                    }
                };

                slots.push(SlotReport {
                    pr_id: pr.pr_id.clone(),
                    old_reviewer,
                    outcome,
                });
            }
        }

        let report = DeactivationReport {
            team_name: team_name.to_string(),
            deactivated_users: user_ids,
            slots,
        };
        info!(
            team = team_name,
            reassigned = report.reassigned_count(),
            skipped = report.skipped_count(),
            "Bulk deactivation finished"
        );
        Ok(report)
    }

    /// Check the batch and return its ids with duplicates removed
    async fn validate(&self, team_name: &str, user_ids: &[String]) -> Result<Vec<String>> {
        if user_ids.is_empty() {
            return Err(Error::Validation("user_ids must not be empty".to_string()));
        }

        if !self.teams.team_exists(team_name).await? {
            return Err(Error::TeamNotFound(team_name.to_string()));
        }

        let mut unique: Vec<String> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if unique.contains(id) {
                continue;
            }
            let user = self
                .users
                .get_user(id)
                .await?
                .ok_or_else(|| Error::UserNotFound(id.clone()))?;
            if user.team_name != team_name {
                return Err(Error::Validation(format!(
                    "user {} does not belong to team {}",
                    id, team_name
                )));
            }
            unique.push(id.clone());
        }
        Ok(unique)
    }
}
