use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::UserId;
use crate::entities::{admin_sessions, admin_users, prelude::*};
use crate::models::{AdminUser, Session};

impl From<admin_sessions::Model> for Session {
    fn from(model: admin_sessions::Model) -> Self {
        Self {
            id: model.id,
            user_id: UserId::new(model.user_id),
            token: model.session_token,
            expires_at: model.expires_at,
        }
    }
}

/// Repository for admin bearer sessions.
///
/// All timestamps are fixed-width UTC strings, so `>`/`<` on the column
/// compare chronologically.
pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: &str,
        now: &str,
    ) -> Result<Session> {
        let active = admin_sessions::ActiveModel {
            user_id: Set(user_id.value()),
            session_token: Set(token.to_string()),
            expires_at: Set(expires_at.to_string()),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to create session")?;

        Ok(Session::from(model))
    }

    /// Session and owner for `token`, provided it expires strictly after `now`.
    pub async fn find_active(
        &self,
        token: &str,
        now: &str,
    ) -> Result<Option<(Session, AdminUser)>> {
        let row = AdminSessions::find()
            .filter(admin_sessions::Column::SessionToken.eq(token))
            .filter(admin_sessions::Column::ExpiresAt.gt(now))
            .find_also_related(admin_users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query session by token")?;

        Ok(row.and_then(|(session, user)| {
            user.map(|u| (Session::from(session), AdminUser::from(u)))
        }))
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let row = AdminSessions::find()
            .filter(admin_sessions::Column::SessionToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query session by token")?;

        Ok(row.map(Session::from))
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let result = AdminSessions::delete_many()
            .filter(admin_sessions::Column::SessionToken.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        let result = AdminSessions::delete_many()
            .filter(admin_sessions::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to delete sessions for user")?;

        Ok(result.rows_affected)
    }

    /// Removes sessions whose expiry is at or before `now`.
    pub async fn delete_expired(&self, now: &str) -> Result<u64> {
        let result = AdminSessions::delete_many()
            .filter(admin_sessions::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected)
    }
}
