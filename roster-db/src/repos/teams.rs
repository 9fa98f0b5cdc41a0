//! Team rosters

use async_trait::async_trait;
use tracing::debug;

use roster_core::{Team, TeamDirectory, TeamMember, User};

use super::users::UserRow;
use crate::{Database, Error};

impl Database {
    async fn insert_team(&self, team: &Team) -> crate::Result<()> {
        let mut tx = self.pool().begin().await?;

        let inserted = sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(Error::from);
        if let Err(e) = inserted {
            if e.is_unique_violation() {
                return Err(roster_core::Error::TeamExists(team.team_name.clone()).into());
            }
            return Err(e);
        }

        // Members already on another team move to this one
        for member in &team.members {
            sqlx::query(
                "INSERT INTO users (user_id, username, team_name, is_active)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active,
                    updated_at = CURRENT_TIMESTAMP",
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&team.team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(team = %team.team_name, members = team.members.len(), "Stored team");
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for Database {
    async fn team_exists(&self, team_name: &str) -> roster_core::Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_one(self.pool())
            .await
            .map_err(Error::from)?;
        Ok(count > 0)
    }

    async fn get_team(&self, team_name: &str) -> roster_core::Result<Option<Team>> {
        if !self.team_exists(team_name).await? {
            return Ok(None);
        }

        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active FROM users
             WHERE team_name = ? ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(self.pool())
        .await
        .map_err(Error::from)?;

        let members = rows
            .into_iter()
            .map(|row| TeamMember::from(&User::from(row)))
            .collect();
        Ok(Some(Team::new(team_name, members)))
    }

    async fn create_team(&self, team: &Team) -> roster_core::Result<()> {
        Ok(self.insert_team(team).await?)
    }
}
