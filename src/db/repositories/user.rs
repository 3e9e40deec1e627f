use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::domain::UserId;
use crate::entities::{admin_users, prelude::*};
use crate::models::AdminUser;

impl From<admin_users::Model> for AdminUser {
    fn from(model: admin_users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            email: model.email,
            created_at: model.created_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self) -> Result<u64> {
        AdminUsers::find()
            .count(&self.conn)
            .await
            .context("Failed to count admin users")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        let user = AdminUsers::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query admin user by email")?;

        Ok(user.map(AdminUser::from))
    }

    /// Get user by email together with the stored password digest
    pub async fn get_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(AdminUser, String)>> {
        let user = AdminUsers::find()
            .filter(admin_users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query admin user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (AdminUser::from(u), password_hash)
        }))
    }

    /// Insert an admin with an already computed digest
    pub async fn create(&self, email: &str, password_hash: &str, now: &str) -> Result<AdminUser> {
        let active = admin_users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to create admin user {email}"))?;

        Ok(AdminUser::from(model))
    }

    /// Replace the stored digest. Returns false if the user does not exist.
    pub async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        now: &str,
    ) -> Result<bool> {
        let Some(user) = AdminUsers::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query admin user for password update")?
        else {
            return Ok(false);
        };

        let mut active: admin_users::ActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(now.to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update password hash")?;

        Ok(true)
    }
}
