//! Pull requests and reviewer slots

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use roster_core::{PrStatus, PrStore, PullRequest, PullRequestShort};

use crate::{Database, Error, Result};

/// Row shape of the `pull_requests` table
#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_pull_request(self, assigned_reviewers: Vec<String>) -> Result<PullRequest> {
        let status: PrStatus = self
            .status
            .parse()
            .map_err(|_| Error::InvalidData(format!("Unknown PR status: {}", self.status)))?;

        Ok(PullRequest {
            pr_id: self.pull_request_id,
            name: self.pull_request_name,
            author_id: self.author_id,
            status,
            assigned_reviewers,
            created_at: self.created_at,
            merged_at: self.merged_at,
        })
    }
}

const SELECT_PR: &str = "SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
     FROM pull_requests";

impl Database {
    async fn reviewers_of(&self, pr_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
        )
        .bind(pr_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn hydrate(&self, row: PullRequestRow) -> Result<PullRequest> {
        let reviewers = self.reviewers_of(&row.pull_request_id).await?;
        row.into_pull_request(reviewers)
    }

    async fn fetch_pr(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        let row: Option<PullRequestRow> =
            sqlx::query_as(&format!("{} WHERE pull_request_id = ?", SELECT_PR))
                .bind(pr_id)
                .fetch_optional(self.pool())
                .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn insert_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO pull_requests
                (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&pr.pr_id)
        .bind(&pr.name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await
        .map_err(Error::from);
        if let Err(e) = inserted {
            if e.is_unique_violation() {
                return Err(roster_core::Error::AlreadyExists(pr.pr_id.clone()).into());
            }
            return Err(e);
        }

        for (position, reviewer) in pr.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, user_id, position) VALUES (?, ?, ?)",
            )
            .bind(&pr.pr_id)
            .bind(reviewer)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Swap one reviewer in a single guarded statement.
    ///
    /// A miss is classified afterwards by re-reading the PR.
    async fn swap_reviewer(&self, pr_id: &str, old: &str, new: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE pr_reviewers SET user_id = ?
             WHERE pull_request_id = ? AND user_id = ?
               AND EXISTS (SELECT 1 FROM pull_requests
                           WHERE pull_request_id = pr_reviewers.pull_request_id
                             AND status = 'OPEN')
               AND NOT EXISTS (SELECT 1 FROM pr_reviewers AS other
                               WHERE other.pull_request_id = pr_reviewers.pull_request_id
                                 AND other.user_id = ?)",
        )
        .bind(new)
        .bind(pr_id)
        .bind(old)
        .bind(new)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 1 {
            debug!(pr_id, old, new, "Swapped reviewer");
            return Ok(());
        }

        let pr = self
            .fetch_pr(pr_id)
            .await?
            .ok_or_else(|| roster_core::Error::PrNotFound(pr_id.to_string()))?;
        let refused = if pr.is_merged() {
            roster_core::Error::PrMerged(pr_id.to_string())
        } else if pr.has_reviewer(new) {
            roster_core::Error::ReviewerTaken {
                pr_id: pr_id.to_string(),
                user_id: new.to_string(),
            }
        } else {
            roster_core::Error::NotAssigned {
                pr_id: pr_id.to_string(),
                user_id: old.to_string(),
            }
        };
        Err(refused.into())
    }

    async fn mark_merged(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        // Only the first merge stamps merged_at
        sqlx::query(
            "UPDATE pull_requests SET status = 'MERGED', merged_at = ?
             WHERE pull_request_id = ? AND status = 'OPEN'",
        )
        .bind(Utc::now())
        .bind(pr_id)
        .execute(self.pool())
        .await?;

        self.fetch_pr(pr_id).await
    }

    async fn open_prs_reviewed_by(&self, user_ids: &[String]) -> Result<Vec<PullRequest>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_PR);
        query.push(
            " WHERE status = 'OPEN' AND pull_request_id IN
              (SELECT pull_request_id FROM pr_reviewers WHERE user_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in user_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated("))");
        query.push(" ORDER BY created_at, pull_request_id");

        let rows: Vec<PullRequestRow> = query.build_query_as().fetch_all(self.pool()).await?;

        let mut prs = Vec::with_capacity(rows.len());
        for row in rows {
            prs.push(self.hydrate(row).await?);
        }
        Ok(prs)
    }

    async fn reviewed_by(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows: Vec<PullRequestRow> = sqlx::query_as(&format!(
            "{} WHERE pull_request_id IN
                (SELECT pull_request_id FROM pr_reviewers WHERE user_id = ?)
             ORDER BY created_at DESC, pull_request_id",
            SELECT_PR
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(|row| row.into_pull_request(Vec::new()).map(|pr| pr.to_short()))
            .collect()
    }
}

#[async_trait]
impl PrStore for Database {
    async fn pr_exists(&self, pr_id: &str) -> roster_core::Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pull_requests WHERE pull_request_id = ?")
                .bind(pr_id)
                .fetch_one(self.pool())
                .await
                .map_err(Error::from)?;
        Ok(count > 0)
    }

    async fn get_pr(&self, pr_id: &str) -> roster_core::Result<Option<PullRequest>> {
        Ok(self.fetch_pr(pr_id).await?)
    }

    async fn create_pr(&self, pr: &PullRequest) -> roster_core::Result<()> {
        Ok(self.insert_pr(pr).await?)
    }

    async fn replace_reviewer(&self, pr_id: &str, old: &str, new: &str) -> roster_core::Result<()> {
        Ok(self.swap_reviewer(pr_id, old, new).await?)
    }

    async fn merge_pr(&self, pr_id: &str) -> roster_core::Result<Option<PullRequest>> {
        Ok(self.mark_merged(pr_id).await?)
    }

    async fn open_prs_by_reviewers(
        &self,
        user_ids: &[String],
    ) -> roster_core::Result<Vec<PullRequest>> {
        Ok(self.open_prs_reviewed_by(user_ids).await?)
    }

    async fn prs_by_reviewer(&self, user_id: &str) -> roster_core::Result<Vec<PullRequestShort>> {
        Ok(self.reviewed_by(user_id).await?)
    }
}
