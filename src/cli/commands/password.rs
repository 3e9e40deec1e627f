//! Set-password command handler

use crate::state::SharedState;

pub async fn cmd_set_password(
    state: &SharedState,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    state
        .auth_service
        .change_password_by_email(email, password)
        .await?;

    println!("Password updated for {email}. All of their sessions were signed out.");
    Ok(())
}
