//! Reviewer assignment on PR creation, single reassignment and merge

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::eligibility::{candidate_pool, Exclusions};
use super::picker::ReviewerPicker;
use crate::directory::{PrStore, UserDirectory};
use crate::models::{PullRequest, User};
use crate::{Error, Result};

/// Reviewers picked for a newly created PR
pub const MAX_REVIEWERS: usize = 2;

/// Outcome of a successful single-reviewer swap
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Picks and commits reviewer assignments
#[derive(Clone)]
pub struct AssignmentEngine {
    users: Arc<dyn UserDirectory>,
    prs: Arc<dyn PrStore>,
    picker: Arc<ReviewerPicker>,
}

impl AssignmentEngine {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        prs: Arc<dyn PrStore>,
        picker: ReviewerPicker,
    ) -> Self {
        Self {
            users,
            prs,
            picker: Arc::new(picker),
        }
    }

    pub fn picker(&self) -> &ReviewerPicker {
        &self.picker
    }

    /// Uniformly pick up to `max_count` reviewers from `candidates`
    pub fn select_reviewers(&self, candidates: &[User], max_count: usize) -> Vec<String> {
        self.picker.select(candidates, max_count)
    }

    /// Create an open PR with up to two reviewers from the author's team.
    pub async fn create_pr(&self, pr_id: &str, name: &str, author_id: &str) -> Result<PullRequest> {
        if self.prs.pr_exists(pr_id).await? {
            return Err(Error::AlreadyExists(pr_id.to_string()));
        }

        let author = self
            .users
            .get_user(author_id)
            .await?
            .ok_or_else(|| Error::AuthorNotFound(author_id.to_string()))?;

        let exclusions = Exclusions::new().with(author_id);
        let pool = candidate_pool(self.users.as_ref(), &author.team_name, &exclusions).await?;
        let reviewers = self.select_reviewers(&pool, MAX_REVIEWERS);

        let pr = PullRequest::new(pr_id, name, author_id).with_reviewers(reviewers);
        self.prs.create_pr(&pr).await?;

        info!(
            pr_id,
            author = author_id,
            team = %author.team_name,
            reviewers = ?pr.assigned_reviewers,
            "Created PR"
        );
        Ok(pr)
    }

    /// Replace `old_reviewer` on an open PR with a random eligible teammate.
    ///
    /// Candidates come from the old reviewer's team and exclude the author
    /// and everyone currently reviewing the PR. On `NoCandidate` the PR is
    /// left untouched.
    pub async fn reassign(&self, pr_id: &str, old_reviewer: &str) -> Result<Reassignment> {
        let pr = self
            .prs
            .get_pr(pr_id)
            .await?
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }
        if !pr.has_reviewer(old_reviewer) {
            return Err(Error::NotAssigned {
                pr_id: pr_id.to_string(),
                user_id: old_reviewer.to_string(),
            });
        }

        let replaced_by = self
            .replace_reviewer(&pr, old_reviewer, &Exclusions::for_pr(&pr))
            .await?;

        let pr = self
            .prs
            .get_pr(pr_id)
            .await?
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

        info!(pr_id, old = old_reviewer, new = %replaced_by, "Reassigned reviewer");
        Ok(Reassignment { pr, replaced_by })
    }

    /// Mark a PR merged. Merging a merged PR returns it unchanged.
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let pr = self
            .prs
            .merge_pr(pr_id)
            .await?
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;
        info!(pr_id, merged_at = ?pr.merged_at, "Merged PR");
        Ok(pr)
    }

    /// Swap one reviewer slot for a candidate from that reviewer's team.
    ///
    /// This is the primitive shared by single reassignment and cascading
    /// deactivation; callers supply the exclusions.
    pub(crate) async fn replace_reviewer(
        &self,
        pr: &PullRequest,
        old_reviewer: &str,
        exclusions: &Exclusions,
    ) -> Result<String> {
        let old = self
            .users
            .get_user(old_reviewer)
            .await?
            .ok_or_else(|| Error::UserNotFound(old_reviewer.to_string()))?;

        let exclusions = exclusions.clone().with(old_reviewer);
        let pool = candidate_pool(self.users.as_ref(), &old.team_name, &exclusions).await?;

        let new_reviewer = self.picker.select_one(&pool).ok_or_else(|| Error::NoCandidate {
            pr_id: pr.pr_id.clone(),
            user_id: old_reviewer.to_string(),
        })?;

        debug!(pr_id = %pr.pr_id, old = old_reviewer, new = %new_reviewer, "Replacing reviewer");
        self.prs
            .replace_reviewer(&pr.pr_id, old_reviewer, &new_reviewer)
            .await?;
        Ok(new_reviewer)
    }
}
