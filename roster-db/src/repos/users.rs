//! User lookup and activation

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use roster_core::{User, UserDirectory};

use crate::{Database, Error};

/// Row shape of the `users` table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

impl Database {
    async fn fetch_user(&self, user_id: &str) -> crate::Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserDirectory for Database {
    async fn get_user(&self, user_id: &str) -> roster_core::Result<Option<User>> {
        Ok(self.fetch_user(user_id).await?)
    }

    async fn active_users_by_team(
        &self,
        team_name: &str,
        exclude: &[String],
    ) -> roster_core::Result<Vec<User>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT user_id, username, team_name, is_active FROM users WHERE is_active = 1 AND team_name = ",
        );
        query.push_bind(team_name);

        if !exclude.is_empty() {
            query.push(" AND user_id NOT IN (");
            let mut ids = query.separated(", ");
            for id in exclude {
                ids.push_bind(id);
            }
            ids.push_unseparated(")");
        }
        query.push(" ORDER BY user_id");

        let rows: Vec<UserRow> = query
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(Error::from)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> roster_core::Result<Option<User>> {
        let result = sqlx::query(
            "UPDATE users SET is_active = ?, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?",
        )
        .bind(is_active)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(Error::from)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(self.fetch_user(user_id).await?)
    }

    async fn bulk_set_active(&self, user_ids: &[String], is_active: bool) -> roster_core::Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET is_active = ");
        query.push_bind(is_active);
        query.push(", updated_at = CURRENT_TIMESTAMP WHERE user_id IN (");
        let mut ids = query.separated(", ");
        for id in user_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated(")");

        query
            .build()
            .execute(self.pool())
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}
