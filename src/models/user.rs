use serde::Serialize;

use crate::domain::UserId;

/// Admin account without its password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: UserId,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i32,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: String,
}
