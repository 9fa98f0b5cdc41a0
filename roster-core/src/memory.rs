//! In-memory implementation of the storage traits.
//!
//! All state lives behind one `RwLock`, so every mutation (including a
//! reviewer swap) is atomic with respect to other mutators. State is lost
//! on restart.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::directory::{PrStore, Reporting, TeamDirectory, UserDirectory};
use crate::models::{
    PrReviewerStats, PullRequest, PullRequestShort, Stats, Team, TeamMember, User,
    UserAssignmentStats,
};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    prs: BTreeMap<String, PullRequest>,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a single user, registering its team.
    pub async fn upsert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.teams.insert(user.team_name.clone());
        state.users.insert(user.user_id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn active_users_by_team(
        &self,
        team_name: &str,
        exclude: &[String],
    ) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .filter(|u| !exclude.contains(&u.user_id))
            .cloned()
            .collect())
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }

    async fn bulk_set_active(&self, user_ids: &[String], is_active: bool) -> Result<()> {
        let mut state = self.state.write().await;
        for id in user_ids {
            if let Some(user) = state.users.get_mut(id) {
                user.is_active = is_active;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for InMemoryStore {
    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.teams.contains(team_name))
    }

    async fn get_team(&self, team_name: &str) -> Result<Option<Team>> {
        let state = self.state.read().await;
        if !state.teams.contains(team_name) {
            return Ok(None);
        }
        let members = state
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(TeamMember::from)
            .collect();
        Ok(Some(Team::new(team_name, members)))
    }

    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.teams.insert(team.team_name.clone()) {
            return Err(Error::TeamExists(team.team_name.clone()));
        }
        for member in &team.members {
            state
                .users
                .insert(member.user_id.clone(), member.to_user(&team.team_name));
        }
        Ok(())
    }
}

#[async_trait]
impl PrStore for InMemoryStore {
    async fn pr_exists(&self, pr_id: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.prs.contains_key(pr_id))
    }

    async fn get_pr(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        let state = self.state.read().await;
        Ok(state.prs.get(pr_id).cloned())
    }

    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut state = self.state.write().await;
        if state.prs.contains_key(&pr.pr_id) {
            return Err(Error::AlreadyExists(pr.pr_id.clone()));
        }
        state.prs.insert(pr.pr_id.clone(), pr.clone());
        Ok(())
    }

    async fn replace_reviewer(&self, pr_id: &str, old: &str, new: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let pr = state
            .prs
            .get_mut(pr_id)
            .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }
        if pr.has_reviewer(new) {
            return Err(Error::ReviewerTaken {
                pr_id: pr_id.to_string(),
                user_id: new.to_string(),
            });
        }
        if !pr.swap_reviewer(old, new) {
            return Err(Error::NotAssigned {
                pr_id: pr_id.to_string(),
                user_id: old.to_string(),
            });
        }
        Ok(())
    }

    async fn merge_pr(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        let mut state = self.state.write().await;
        Ok(state.prs.get_mut(pr_id).map(|pr| {
            pr.mark_merged();
            pr.clone()
        }))
    }

    async fn open_prs_by_reviewers(&self, user_ids: &[String]) -> Result<Vec<PullRequest>> {
        let state = self.state.read().await;
        Ok(state
            .prs
            .values()
            .filter(|pr| pr.is_open())
            .filter(|pr| user_ids.iter().any(|id| pr.has_reviewer(id)))
            .cloned()
            .collect())
    }

    async fn prs_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;
        let mut prs: Vec<&PullRequest> = state
            .prs
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .collect();
        prs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.pr_id.cmp(&b.pr_id))
        });
        Ok(prs.into_iter().map(PullRequest::to_short).collect())
    }
}

#[async_trait]
impl Reporting for InMemoryStore {
    async fn stats(&self) -> Result<Stats> {
        let state = self.state.read().await;

        let reviewed: Vec<usize> = state
            .prs
            .values()
            .map(|pr| pr.assigned_reviewers.len())
            .filter(|n| *n > 0)
            .collect();
        let average_reviewers_per_pr = if reviewed.is_empty() {
            0.0
        } else {
            reviewed.iter().sum::<usize>() as f64 / reviewed.len() as f64
        };

        let mut assignments_by_user: Vec<UserAssignmentStats> = state
            .users
            .values()
            .map(|user| UserAssignmentStats {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                assignment_count: state
                    .prs
                    .values()
                    .filter(|pr| pr.has_reviewer(&user.user_id))
                    .count() as i64,
            })
            .collect();
        assignments_by_user.sort_by(|a, b| {
            b.assignment_count
                .cmp(&a.assignment_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let mut reviewers_per_pr: Vec<PrReviewerStats> = state
            .prs
            .values()
            .map(|pr| PrReviewerStats {
                pr_id: pr.pr_id.clone(),
                pr_name: pr.name.clone(),
                reviewer_count: pr.assigned_reviewers.len() as i64,
            })
            .collect();
        reviewers_per_pr.sort_by(|a, b| {
            b.reviewer_count
                .cmp(&a.reviewer_count)
                .then_with(|| a.pr_id.cmp(&b.pr_id))
        });

        Ok(Stats {
            total_prs: state.prs.len() as i64,
            total_users: state.users.len() as i64,
            average_reviewers_per_pr,
            assignments_by_user,
            reviewers_per_pr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn backend_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .create_team(&Team::new(
                "backend",
                vec![
                    TeamMember::new("u1", "Alice", true),
                    TeamMember::new("u2", "Bob", true),
                    TeamMember::new("u3", "Carol", false),
                ],
            ))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_team_twice_fails() {
        let store = backend_store().await;
        let err = store
            .create_team(&Team::new("backend", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TeamExists(name) if name == "backend"));
    }

    #[tokio::test]
    async fn test_active_users_excludes() {
        let store = backend_store().await;
        let users = store
            .active_users_by_team("backend", &["u1".to_string()])
            .await
            .unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_replace_reviewer_rejects_merged() {
        let store = backend_store().await;
        let pr = PullRequest::new("p1", "x", "u1").with_reviewers(vec!["u2".into()]);
        store.create_pr(&pr).await.unwrap();
        store.merge_pr("p1").await.unwrap();

        let err = store.replace_reviewer("p1", "u2", "u3").await.unwrap_err();
        assert!(matches!(err, Error::PrMerged(_)));
        let pr = store.get_pr("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_replace_reviewer_not_assigned() {
        let store = backend_store().await;
        let pr = PullRequest::new("p1", "x", "u1").with_reviewers(vec!["u2".into()]);
        store.create_pr(&pr).await.unwrap();

        let err = store.replace_reviewer("p1", "u3", "u4").await.unwrap_err();
        assert!(matches!(err, Error::NotAssigned { .. }));
    }

    #[tokio::test]
    async fn test_replace_reviewer_refuses_duplicate() {
        let store = backend_store().await;
        let pr = PullRequest::new("p1", "x", "u1")
            .with_reviewers(vec!["u2".into(), "u3".into()]);
        store.create_pr(&pr).await.unwrap();

        let err = store.replace_reviewer("p1", "u2", "u3").await.unwrap_err();
        assert!(matches!(err, Error::ReviewerTaken { ref user_id, .. } if user_id == "u3"));
        let pr = store.get_pr("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn test_stats_average_skips_unreviewed() {
        let store = backend_store().await;
        store
            .create_pr(&PullRequest::new("p1", "a", "u1").with_reviewers(vec!["u2".into()]))
            .await
            .unwrap();
        store
            .create_pr(
                &PullRequest::new("p2", "b", "u1")
                    .with_reviewers(vec!["u2".into(), "u3".into()]),
            )
            .await
            .unwrap();
        store.create_pr(&PullRequest::new("p3", "c", "u2")).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_prs, 3);
        assert_eq!(stats.total_users, 3);
        assert!((stats.average_reviewers_per_pr - 1.5).abs() < f64::EPSILON);
        assert_eq!(stats.assignments_by_user[0].user_id, "u2");
        assert_eq!(stats.assignments_by_user[0].assignment_count, 2);
        assert_eq!(stats.reviewers_per_pr[0].pr_id, "p2");
    }
}
