//! Domain service for admin authentication and sessions.
//!
//! Handles credential checks, session issuance and validation, logout,
//! password changes and housekeeping of expired sessions.

use crate::domain::UserId;
use crate::models::AdminUser;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password both map here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown, expired or revoked session token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user: AdminUser,
    #[serde(skip)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Checks credentials and mints a new session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email and for a
    /// wrong password alike.
    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Owner of `token` if the session exists and has not expired.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] otherwise.
    async fn validate(&self, token: &str) -> Result<AdminUser, AuthError>;

    /// Deletes the session. Unknown tokens are not an error.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Stores a digest of `new_password` and revokes every session of the user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if the password is shorter than the configured minimum
    /// - [`AuthError::NotFound`] if the user does not exist
    async fn change_password(&self, user_id: UserId, new_password: &str) -> Result<(), AuthError>;

    /// Same as [`AuthService::change_password`], addressing the user by email.
    async fn change_password_by_email(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Deletes sessions whose expiry has passed. Returns how many were removed.
    async fn cleanup_expired(&self) -> Result<u64, AuthError>;

    /// Creates the admin account when no admin exists yet.
    ///
    /// Returns the created user, or `None` if an admin was already present.
    async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminUser>, AuthError>;
}
