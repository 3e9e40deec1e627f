//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::domain::UserId;
use crate::models::AdminUser;
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::password::{PasswordHasher, generate_session_token};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Store,
    hasher: Arc<dyn PasswordHasher>,
    session_ttl: Duration,
    min_password_length: usize,
    /// Digest verified against when the email is unknown, so both failure
    /// paths cost one verification.
    dummy_digest: OnceCell<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, hasher: Arc<dyn PasswordHasher>, config: &SecurityConfig) -> Self {
        Self {
            store,
            hasher,
            session_ttl: Duration::hours(i64::from(config.session_ttl_hours)),
            min_password_length: config.min_password_length,
            dummy_digest: OnceCell::new(),
        }
    }

    async fn dummy_verify(&self, password: &str) -> Result<(), AuthError> {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hasher.hash("nurtal-dummy-password"))
            .await?;
        let _ = self.hasher.verify(password, digest).await?;
        Ok(())
    }

    fn check_password_length(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = email.trim();

        let Some((user, digest)) = self.store.get_admin_user_with_password(email).await? else {
            self.dummy_verify(password).await?;
            warn!("Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &digest).await? {
            warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.store.create_session(user.id, &token, expires_at).await?;

        info!(user_id = %user.id, "Admin logged in");

        Ok(LoginResult {
            user,
            token,
            expires_at,
        })
    }

    async fn validate(&self, token: &str) -> Result<AdminUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        self.store
            .find_active_session(token, Utc::now())
            .await?
            .map(|(_, user)| user)
            .ok_or(AuthError::Unauthorized)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.store.delete_session(token).await? {
            info!("Admin logged out");
        }
        Ok(())
    }

    async fn change_password(&self, user_id: UserId, new_password: &str) -> Result<(), AuthError> {
        self.check_password_length(new_password)?;

        let digest = self.hasher.hash(new_password).await?;
        if !self.store.update_admin_password_hash(user_id, &digest).await? {
            return Err(AuthError::NotFound);
        }

        let revoked = self.store.delete_sessions_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "Password changed, sessions revoked");

        Ok(())
    }

    async fn change_password_by_email(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .get_admin_user_by_email(email.trim())
            .await?
            .ok_or(AuthError::NotFound)?;

        self.change_password(user.id, new_password).await
    }

    async fn cleanup_expired(&self) -> Result<u64, AuthError> {
        let removed = self.store.delete_expired_sessions(Utc::now()).await?;
        info!(removed, "Expired sessions cleaned up");
        Ok(removed)
    }

    async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminUser>, AuthError> {
        if self.store.count_admin_users().await? > 0 {
            return Ok(None);
        }

        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".to_string()));
        }
        self.check_password_length(password)?;

        let digest = self.hasher.hash(password).await?;
        let user = self.store.create_admin_user(email, &digest).await?;
        info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");

        Ok(Some(user))
    }
}
