//! Aggregate reporting queries

use async_trait::async_trait;

use roster_core::models::{PrReviewerStats, UserAssignmentStats};
use roster_core::{Reporting, Stats};

use crate::{Database, Result};

impl Database {
    async fn collect_stats(&self) -> Result<Stats> {
        let (total_prs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pull_requests")
            .fetch_one(self.pool())
            .await?;
        let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;

        // PRs without reviewers have no rows here and so drop out of the mean
        let (average,): (Option<f64>,) = sqlx::query_as(
            "SELECT AVG(reviewer_count) FROM
                (SELECT COUNT(*) AS reviewer_count FROM pr_reviewers GROUP BY pull_request_id)",
        )
        .fetch_one(self.pool())
        .await?;

        let by_user: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT u.user_id, u.username, COUNT(r.pull_request_id) AS assignment_count
             FROM users u
             LEFT JOIN pr_reviewers r ON r.user_id = u.user_id
             GROUP BY u.user_id, u.username
             ORDER BY assignment_count DESC, u.user_id",
        )
        .fetch_all(self.pool())
        .await?;

        let by_pr: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT p.pull_request_id, p.pull_request_name, COUNT(r.user_id) AS reviewer_count
             FROM pull_requests p
             LEFT JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
             GROUP BY p.pull_request_id, p.pull_request_name
             ORDER BY reviewer_count DESC, p.pull_request_id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(Stats {
            total_prs,
            total_users,
            average_reviewers_per_pr: average.unwrap_or(0.0),
            assignments_by_user: by_user
                .into_iter()
                .map(|(user_id, username, assignment_count)| UserAssignmentStats {
                    user_id,
                    username,
                    assignment_count,
                })
                .collect(),
            reviewers_per_pr: by_pr
                .into_iter()
                .map(|(pr_id, pr_name, reviewer_count)| PrReviewerStats {
                    pr_id,
                    pr_name,
                    reviewer_count,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl Reporting for Database {
    async fn stats(&self) -> roster_core::Result<Stats> {
        Ok(self.collect_stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{backend_db, temp_db};
    use roster_core::{PrStore, PullRequest};

    #[tokio::test]
    async fn test_stats_empty() {
        let (_dir, db) = temp_db().await;
        let stats = db.stats().await.unwrap();
        assert_eq!(stats, Stats::default());
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let (_dir, db) = backend_db().await;
        db.create_pr(&PullRequest::new("p1", "One", "u1").with_reviewers(vec!["u2".into(), "u3".into()]))
            .await
            .unwrap();
        db.create_pr(&PullRequest::new("p2", "Two", "u2").with_reviewers(vec!["u3".into()]))
            .await
            .unwrap();
        db.create_pr(&PullRequest::new("p3", "Three", "u3")).await.unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_prs, 3);
        assert_eq!(stats.total_users, 4);
        assert!((stats.average_reviewers_per_pr - 1.5).abs() < f64::EPSILON);

        assert_eq!(stats.assignments_by_user[0].user_id, "u3");
        assert_eq!(stats.assignments_by_user[0].assignment_count, 2);
        assert_eq!(stats.assignments_by_user[1].user_id, "u2");
        let zeros: Vec<_> = stats.assignments_by_user[2..]
            .iter()
            .map(|s| s.user_id.as_str())
            .collect();
        assert_eq!(zeros, vec!["u1", "u4"]);

        let per_pr: Vec<_> = stats
            .reviewers_per_pr
            .iter()
            .map(|s| (s.pr_id.as_str(), s.reviewer_count))
            .collect();
        assert_eq!(per_pr, vec![("p1", 2), ("p2", 1), ("p3", 0)]);
        assert_eq!(stats.reviewers_per_pr[0].pr_name, "One");
    }
}
