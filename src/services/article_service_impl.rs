//! `SeaORM` implementation of the `ArticleService` trait.

use crate::db::{SlugWrite, Store, format_timestamp};
use crate::domain::text::{calculate_read_time, generate_slug, resolve_unique_slug};
use crate::domain::{ArticleId, ArticleStatus, Category};
use crate::models::{Article, ArticleChanges, ArticleQuery, NewArticle};
use crate::services::article_service::{ArticleError, ArticleService};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

/// How often a write is retried after losing a slug to a concurrent writer.
const MAX_SLUG_ATTEMPTS: usize = 5;

pub struct SeaOrmArticleService {
    store: Store,
}

impl SeaOrmArticleService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lowest free slug for `title`, ignoring `exclude` when given.
    async fn free_slug(&self, title: &str, exclude: Option<&ArticleId>) -> Result<String, ArticleError> {
        let base = generate_slug(title);
        let taken = self
            .store
            .article_slugs_with_base(&base, exclude.map(ArticleId::as_str))
            .await?;

        Ok(resolve_unique_slug(&base, |candidate| taken.contains(candidate)))
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, ArticleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArticleError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

fn parse_category(value: &str) -> Result<Category, ArticleError> {
    value.trim().parse().map_err(|_| {
        let allowed: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        ArticleError::Validation(format!("category must be one of: {}", allowed.join(", ")))
    })
}

fn parse_status(value: &str) -> Result<ArticleStatus, ArticleError> {
    value
        .trim()
        .parse()
        .map_err(|_| ArticleError::Validation("status must be draft or published".to_string()))
}

/// Trims each tag, drops empties and repeats, keeps first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn optional_url(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl ArticleService for SeaOrmArticleService {
    async fn list_all(&self) -> Result<Vec<Article>, ArticleError> {
        Ok(self.store.list_articles().await?)
    }

    async fn list_published(&self) -> Result<Vec<Article>, ArticleError> {
        Ok(self
            .store
            .list_articles_by_status(ArticleStatus::Published)
            .await?)
    }

    async fn get_by_id(&self, id: &ArticleId) -> Result<Article, ArticleError> {
        self.store
            .get_article(id.as_str())
            .await?
            .ok_or_else(|| ArticleError::not_found(id.as_str()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Article, ArticleError> {
        self.store
            .get_article_by_slug(slug)
            .await?
            .ok_or_else(|| ArticleError::not_found(slug))
    }

    async fn create(&self, input: NewArticle) -> Result<Article, ArticleError> {
        let title = require("title", &input.title)?.to_string();
        let excerpt = require("excerpt", &input.excerpt)?.to_string();
        require("content", &input.content)?;
        let author = require("author", &input.author)?.to_string();
        let category = parse_category(require("category", &input.category)?)?;
        let status = match input.status.as_deref().map(str::trim) {
            None | Some("") => ArticleStatus::API_DEFAULT,
            Some(s) => parse_status(s)?,
        };

        let now = format_timestamp(Utc::now());
        let mut article = Article {
            id: ArticleId::generate(),
            slug: String::new(),
            read_time: calculate_read_time(&input.content),
            title,
            excerpt,
            content: input.content,
            author,
            category,
            tags: normalize_tags(input.tags),
            image_url: optional_url(input.image_url),
            video_url: optional_url(input.video_url),
            featured: input.featured,
            status,
            published_at: now.clone(),
            updated_at: now,
        };

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            article.slug = self.free_slug(&article.title, None).await?;

            match self.store.insert_article(&article).await? {
                SlugWrite::Written => {
                    info!(id = %article.id, slug = %article.slug, status = %article.status, "Article created");
                    return Ok(article);
                }
                SlugWrite::SlugTaken => {
                    warn!(slug = %article.slug, attempt, "Slug claimed concurrently, retrying");
                }
            }
        }

        Err(ArticleError::Storage(format!(
            "could not claim a unique slug after {MAX_SLUG_ATTEMPTS} attempts"
        )))
    }

    async fn update(
        &self,
        id: &ArticleId,
        changes: ArticleChanges,
    ) -> Result<Article, ArticleError> {
        let mut article = self.get_by_id(id).await?;

        let retitled = match changes.title.as_deref() {
            Some(title) => {
                let title = require("title", title)?;
                let differs = title != article.title;
                article.title = title.to_string();
                differs
            }
            None => false,
        };
        if let Some(excerpt) = changes.excerpt.as_deref() {
            article.excerpt = require("excerpt", excerpt)?.to_string();
        }
        if let Some(content) = changes.content {
            require("content", &content)?;
            article.read_time = calculate_read_time(&content);
            article.content = content;
        }
        if let Some(author) = changes.author.as_deref() {
            article.author = require("author", author)?.to_string();
        }
        if let Some(category) = changes.category.as_deref() {
            article.category = parse_category(require("category", category)?)?;
        }
        if let Some(status) = changes.status.as_deref() {
            article.status = parse_status(status)?;
        }
        if let Some(tags) = changes.tags {
            article.tags = normalize_tags(tags);
        }
        if changes.image_url.is_some() {
            article.image_url = optional_url(changes.image_url);
        }
        if changes.video_url.is_some() {
            article.video_url = optional_url(changes.video_url);
        }
        if let Some(featured) = changes.featured {
            article.featured = featured;
        }

        article.updated_at = format_timestamp(Utc::now());

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            if retitled {
                article.slug = self.free_slug(&article.title, Some(id)).await?;
            }

            match self.store.update_article(&article).await? {
                None => return Err(ArticleError::not_found(id.as_str())),
                Some(SlugWrite::Written) => {
                    info!(id = %article.id, slug = %article.slug, "Article updated");
                    return Ok(article);
                }
                Some(SlugWrite::SlugTaken) if retitled => {
                    warn!(slug = %article.slug, attempt, "Slug claimed concurrently, retrying");
                }
                Some(SlugWrite::SlugTaken) => {
                    return Err(ArticleError::Storage(
                        "slug conflict on an unchanged slug".to_string(),
                    ));
                }
            }
        }

        Err(ArticleError::Storage(format!(
            "could not claim a unique slug after {MAX_SLUG_ATTEMPTS} attempts"
        )))
    }

    async fn delete(&self, id: &ArticleId) -> Result<bool, ArticleError> {
        let removed = self.store.delete_article(id.as_str()).await?;
        if removed {
            info!(id = %id, "Article deleted");
        }
        Ok(removed)
    }

    async fn search(&self, query: &ArticleQuery) -> Result<Vec<Article>, ArticleError> {
        Ok(self.store.search_articles(query).await?)
    }
}
