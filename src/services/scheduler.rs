use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::AuthService;

/// Runs housekeeping jobs on cron expressions until stopped.
pub struct Scheduler {
    auth: Arc<dyn AuthService>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(auth: Arc<dyn AuthService>, config: SchedulerConfig) -> Self {
        Self {
            auth,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        let mut sched = JobScheduler::new().await?;

        let auth = Arc::clone(&self.auth);
        let running = Arc::clone(&self.running);
        let cleanup_job = Job::new_async(self.config.session_cleanup_cron.as_str(), move |_uuid, _lock| {
            let auth = Arc::clone(&auth);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_session_cleanup(auth.as_ref()).await;
            })
        })?;

        sched.add(cleanup_job).await?;
        sched.start().await?;

        info!(
            "Session cleanup scheduled: {}",
            self.config.session_cleanup_cron
        );

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Runs every job once, immediately.
    pub async fn run_once(&self) {
        run_session_cleanup(self.auth.as_ref()).await;
    }
}

async fn run_session_cleanup(auth: &dyn AuthService) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "cleanup_sessions", "Starting session cleanup");

    match auth.cleanup_expired().await {
        Ok(removed) => info!(
            event = "job_finished",
            job_name = "cleanup_sessions",
            removed,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Session cleanup finished"
        ),
        Err(e) => error!(
            event = "job_failed",
            job_name = "cleanup_sessions",
            error = %e,
            "Session cleanup failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::Store;
    use crate::services::{Argon2Hasher, SeaOrmAuthService};
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn test_run_once_removes_expired_sessions() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let hasher = Arc::new(Argon2Hasher::new(&security).unwrap());
        let auth = Arc::new(SeaOrmAuthService::new(store.clone(), hasher, &security));
        let user = auth
            .ensure_bootstrap_admin("admin@example.com", "correct-horse")
            .await
            .unwrap()
            .unwrap();

        let now = Utc::now();
        store
            .create_session(user.id, "stale", now - ChronoDuration::hours(1))
            .await
            .unwrap();
        store
            .create_session(user.id, "fresh", now + ChronoDuration::hours(1))
            .await
            .unwrap();

        let scheduler = Scheduler::new(auth, SchedulerConfig::default());
        assert!(!scheduler.is_running().await);
        scheduler.run_once().await;

        assert!(store.get_session("stale").await.unwrap().is_none());
        assert!(store.get_session("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disabled_scheduler_returns_immediately() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig::default();
        let hasher = Arc::new(Argon2Hasher::new(&security).unwrap());
        let auth = Arc::new(SeaOrmAuthService::new(store, hasher, &security));

        let config = SchedulerConfig {
            enabled: false,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::new(auth, config);
        scheduler.start().await.unwrap();
        assert!(!scheduler.is_running().await);
    }
}
