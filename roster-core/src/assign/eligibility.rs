//! Candidate pool construction shared by single and cascading reassignment

use tracing::debug;

use crate::directory::UserDirectory;
use crate::models::{PullRequest, User};
use crate::Result;

/// Ids that must never be picked as a replacement reviewer
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    ids: Vec<String>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusions for replacing a reviewer on `pr`: the author and every
    /// reviewer currently on the PR, the one being replaced included.
    pub fn for_pr(pr: &PullRequest) -> Self {
        Self::new()
            .with(&pr.author_id)
            .with_all(&pr.assigned_reviewers)
    }

    pub fn with(mut self, id: &str) -> Self {
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
        self
    }

    pub fn with_all<S: AsRef<str>>(self, ids: &[S]) -> Self {
        ids.iter().fold(self, |acc, id| acc.with(id.as_ref()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

/// Active members of `team_name` that are not excluded
pub async fn candidate_pool(
    users: &dyn UserDirectory,
    team_name: &str,
    exclusions: &Exclusions,
) -> Result<Vec<User>> {
    let pool = users
        .active_users_by_team(team_name, exclusions.as_slice())
        .await?;
    debug!(
        team = team_name,
        excluded = exclusions.as_slice().len(),
        candidates = pool.len(),
        "Built candidate pool"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::TeamDirectory;
    use crate::memory::InMemoryStore;
    use crate::models::{Team, TeamMember};

    #[test]
    fn test_for_pr_excludes_author_and_reviewers() {
        let pr = PullRequest::new("p1", "x", "u1")
            .with_reviewers(vec!["u2".to_string(), "u3".to_string()]);
        let ex = Exclusions::for_pr(&pr);
        assert!(ex.contains("u1"));
        assert!(ex.contains("u2"));
        assert!(ex.contains("u3"));
        assert!(!ex.contains("u4"));
    }

    #[test]
    fn test_with_skips_duplicates() {
        let ex = Exclusions::new().with("u1").with_all(&["u1", "u2"]);
        assert_eq!(ex.as_slice(), &["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test]
    async fn test_candidate_pool_filters_inactive_and_excluded() {
        let store = InMemoryStore::new();
        store
            .create_team(&Team::new(
                "backend",
                vec![
                    TeamMember::new("u1", "Alice", true),
                    TeamMember::new("u2", "Bob", false),
                    TeamMember::new("u3", "Carol", true),
                    TeamMember::new("u4", "Dan", true),
                ],
            ))
            .await
            .unwrap();

        let pool = candidate_pool(&store, "backend", &Exclusions::new().with("u3"))
            .await
            .unwrap();
        let ids: Vec<_> = pool.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u4"]);
    }
}
