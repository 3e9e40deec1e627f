//! Cleanup-sessions command handler

use crate::state::SharedState;

pub async fn cmd_cleanup_sessions(state: &SharedState) -> anyhow::Result<()> {
    let removed = state.auth_service.cleanup_expired().await?;
    println!("Removed {removed} expired session(s).");
    Ok(())
}
