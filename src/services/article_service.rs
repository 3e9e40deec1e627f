//! Domain service for the article store.
//!
//! Owns slug assignment and the derived fields (read time, timestamps); handlers
//! never write article rows directly.

use crate::domain::ArticleId;
use crate::models::{Article, ArticleChanges, ArticleQuery, NewArticle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArticleError {
    /// Missing or malformed input. The message names the offending field.
    #[error("{0}")]
    Validation(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ArticleError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }
}

impl From<anyhow::Error> for ArticleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Domain service trait for articles.
///
/// ```rust,ignore
/// use nurtal::services::{ArticleError, ArticleService};
/// use std::sync::Arc;
///
/// async fn front_page(service: Arc<dyn ArticleService>) -> Result<usize, ArticleError> {
///     Ok(service.list_published().await?.len())
/// }
/// ```
#[async_trait::async_trait]
pub trait ArticleService: Send + Sync {
    /// Every article, newest first.
    async fn list_all(&self) -> Result<Vec<Article>, ArticleError>;

    /// Published articles only, newest first. Never contains drafts.
    async fn list_published(&self) -> Result<Vec<Article>, ArticleError>;

    /// # Errors
    ///
    /// Returns [`ArticleError::NotFound`] if no article has this id.
    async fn get_by_id(&self, id: &ArticleId) -> Result<Article, ArticleError>;

    /// Exact slug match.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleError::NotFound`] if no article has this slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Article, ArticleError>;

    /// Validates, derives slug and read time, stamps both timestamps and persists.
    ///
    /// # Errors
    ///
    /// - [`ArticleError::Validation`] naming the first missing required field
    ///   (title, excerpt, content, author, category) or an unknown category/status
    /// - [`ArticleError::Storage`] if the datastore fails or no free slug could be
    ///   claimed
    async fn create(&self, input: NewArticle) -> Result<Article, ArticleError>;

    /// Merges `changes` into the stored article.
    ///
    /// The slug is re-resolved only when the title changes, and the article's own
    /// slug never counts as a collision. `publishedAt` is never touched.
    async fn update(&self, id: &ArticleId, changes: ArticleChanges)
    -> Result<Article, ArticleError>;

    /// Returns whether a row existed to remove.
    async fn delete(&self, id: &ArticleId) -> Result<bool, ArticleError>;

    /// Case-insensitive substring match on title, excerpt or content, narrowed by
    /// the optional exact category and status filters.
    async fn search(&self, query: &ArticleQuery) -> Result<Vec<Article>, ArticleError>;
}
