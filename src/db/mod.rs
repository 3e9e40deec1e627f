use crate::domain::{ArticleStatus, UserId};
use crate::models::{AdminUser, Article, ArticleQuery, Session};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::article::SlugWrite;

/// Renders a timestamp the way every timestamp column stores it.
///
/// The width is fixed (microseconds, `Z` suffix), so lexicographic order on
/// the stored text equals chronological order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        // Each pooled connection to `sqlite::memory:` would be its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    // ========== Article Repository Methods ==========

    fn article_repo(&self) -> repositories::article::ArticleRepository {
        repositories::article::ArticleRepository::new(self.conn.clone())
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        self.article_repo().list_all().await
    }

    pub async fn list_articles_by_status(&self, status: ArticleStatus) -> Result<Vec<Article>> {
        self.article_repo().list_by_status(status).await
    }

    pub async fn get_article(&self, id: &str) -> Result<Option<Article>> {
        self.article_repo().get(id).await
    }

    pub async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.article_repo().get_by_slug(slug).await
    }

    pub async fn article_slugs_with_base(
        &self,
        base: &str,
        exclude_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        self.article_repo().slugs_with_base(base, exclude_id).await
    }

    pub async fn search_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        self.article_repo().search(query).await
    }

    pub async fn insert_article(&self, article: &Article) -> Result<SlugWrite> {
        self.article_repo().insert(article).await
    }

    pub async fn update_article(&self, article: &Article) -> Result<Option<SlugWrite>> {
        self.article_repo().update(article).await
    }

    pub async fn delete_article(&self, id: &str) -> Result<bool> {
        self.article_repo().delete(id).await
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn count_admin_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn get_admin_user_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_admin_user_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(AdminUser, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn create_admin_user(&self, email: &str, password_hash: &str) -> Result<AdminUser> {
        let now = format_timestamp(Utc::now());
        self.user_repo().create(email, password_hash, &now).await
    }

    pub async fn update_admin_password_hash(&self, id: UserId, password_hash: &str) -> Result<bool> {
        let now = format_timestamp(Utc::now());
        self.user_repo()
            .update_password_hash(id, password_hash, &now)
            .await
    }

    // ========== Session Repository Methods ==========

    #[must_use]
    pub fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    pub async fn create_session(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let now = format_timestamp(Utc::now());
        self.session_repo()
            .create(user_id, token, &format_timestamp(expires_at), &now)
            .await
    }

    pub async fn find_active_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Session, AdminUser)>> {
        self.session_repo()
            .find_active(token, &format_timestamp(now))
            .await
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_repo().find_by_token(token).await
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        self.session_repo().delete_by_token(token).await
    }

    pub async fn delete_sessions_for_user(&self, user_id: UserId) -> Result<u64> {
        self.session_repo().delete_for_user(user_id).await
    }

    pub async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        self.session_repo()
            .delete_expired(&format_timestamp(now))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn memory_store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn timestamps_are_fixed_width_and_sortable() {
        let early = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let later = early + chrono::Duration::milliseconds(1);
        let (a, b) = (format_timestamp(early), format_timestamp(later));
        assert_eq!(a, "2025-01-02T03:04:05.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[tokio::test]
    async fn test_session_expiry_boundary() {
        let store = memory_store().await;
        let user = store
            .create_admin_user("editor@example.com", "digest")
            .await
            .unwrap();

        let now = Utc::now();
        store
            .create_session(user.id, "live", now + chrono::Duration::hours(1))
            .await
            .unwrap();
        store
            .create_session(user.id, "stale", now - chrono::Duration::seconds(1))
            .await
            .unwrap();

        let (session, owner) = store.find_active_session("live", now).await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(owner.email, "editor@example.com");
        assert!(store.find_active_session("stale", now).await.unwrap().is_none());

        // Still stored until cleanup runs.
        assert!(store.get_session("stale").await.unwrap().is_some());
        assert_eq!(store.delete_expired_sessions(now).await.unwrap(), 1);
        assert!(store.get_session("stale").await.unwrap().is_none());
        assert!(store.get_session("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_sessions_for_user() {
        let store = memory_store().await;
        let user = store.create_admin_user("a@example.com", "x").await.unwrap();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store.create_session(user.id, "t1", expires).await.unwrap();
        store.create_session(user.id, "t2", expires).await.unwrap();

        assert_eq!(store.delete_sessions_for_user(user.id).await.unwrap(), 2);
        assert!(!store.delete_session("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_email_is_unique() {
        let store = memory_store().await;
        store.create_admin_user("a@example.com", "x").await.unwrap();
        assert!(store.create_admin_user("a@example.com", "y").await.is_err());
        assert_eq!(store.count_admin_users().await.unwrap(), 1);
    }
}
