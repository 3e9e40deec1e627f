use crate::domain::{ArticleId, ArticleStatus, Category};
use crate::entities::{articles, prelude::*};
use crate::models::{Article, ArticleQuery};
use anyhow::{Context, Result};
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, SqlErr,
};
use std::collections::HashSet;

/// Outcome of a write that assigns a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugWrite {
    Written,
    /// The datastore rejected the slug because another row holds it.
    SlugTaken,
}

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model(model: articles::Model) -> Result<Article> {
        let category: Category = model
            .category
            .parse()
            .with_context(|| format!("Corrupt category on article {}", model.id))?;
        let status: ArticleStatus = model
            .status
            .parse()
            .with_context(|| format!("Corrupt status on article {}", model.id))?;
        let tags: Vec<String> = serde_json::from_str(&model.tags)
            .with_context(|| format!("Corrupt tags on article {}", model.id))?;

        Ok(Article {
            id: ArticleId::from(model.id),
            slug: model.slug,
            title: model.title,
            excerpt: model.excerpt,
            content: model.content,
            author: model.author,
            category,
            tags,
            image_url: model.image_url,
            video_url: model.video_url,
            featured: model.featured,
            status,
            read_time: model.read_time,
            published_at: model.published_at,
            updated_at: model.updated_at,
        })
    }

    fn map_all(rows: Vec<articles::Model>) -> Result<Vec<Article>> {
        rows.into_iter().map(Self::map_model).collect()
    }

    fn to_active_model(article: &Article) -> Result<articles::ActiveModel> {
        Ok(articles::ActiveModel {
            id: Set(article.id.as_str().to_string()),
            slug: Set(article.slug.clone()),
            title: Set(article.title.clone()),
            excerpt: Set(article.excerpt.clone()),
            content: Set(article.content.clone()),
            author: Set(article.author.clone()),
            category: Set(article.category.as_str().to_string()),
            tags: Set(serde_json::to_string(&article.tags).context("Failed to encode tags")?),
            image_url: Set(article.image_url.clone()),
            video_url: Set(article.video_url.clone()),
            featured: Set(article.featured),
            status: Set(article.status.as_str().to_string()),
            read_time: Set(article.read_time),
            published_at: Set(article.published_at.clone()),
            updated_at: Set(article.updated_at.clone()),
        })
    }

    fn is_slug_conflict(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("slug"))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn list_all(&self) -> Result<Vec<Article>> {
        let rows = Articles::find()
            .order_by_desc(articles::Column::PublishedAt)
            .order_by_asc(articles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list articles")?;

        Self::map_all(rows)
    }

    pub async fn list_by_status(&self, status: ArticleStatus) -> Result<Vec<Article>> {
        let rows = Articles::find()
            .filter(articles::Column::Status.eq(status.as_str()))
            .order_by_desc(articles::Column::PublishedAt)
            .order_by_asc(articles::Column::Id)
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to list {status} articles"))?;

        Self::map_all(rows)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Article>> {
        let row = Articles::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query article by id")?;

        row.map(Self::map_model).transpose()
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = Articles::find()
            .filter(articles::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query article by slug")?;

        row.map(Self::map_model).transpose()
    }

    /// Slugs equal to `base` or of the form `base-<anything>`, optionally
    /// ignoring one article.
    pub async fn slugs_with_base(
        &self,
        base: &str,
        exclude_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        let mut query = Articles::find()
            .select_only()
            .column(articles::Column::Slug)
            .filter(
                Condition::any()
                    .add(articles::Column::Slug.eq(base))
                    .add(articles::Column::Slug.like(format!("{base}-%"))),
            );

        if let Some(id) = exclude_id {
            query = query.filter(articles::Column::Id.ne(id));
        }

        let slugs: Vec<String> = query
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query existing slugs")?;

        Ok(slugs.into_iter().collect())
    }

    pub async fn search(&self, criteria: &ArticleQuery) -> Result<Vec<Article>> {
        let mut query = Articles::find();

        if let Some(text) = criteria.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            let contains = |column: articles::Column| {
                Expr::expr(Func::lower(Expr::col(column)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            query = query.filter(
                Condition::any()
                    .add(contains(articles::Column::Title))
                    .add(contains(articles::Column::Excerpt))
                    .add(contains(articles::Column::Content)),
            );
        }

        if let Some(category) = criteria.category {
            query = query.filter(articles::Column::Category.eq(category.as_str()));
        }

        if let Some(status) = criteria.status {
            query = query.filter(articles::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .order_by_desc(articles::Column::PublishedAt)
            .order_by_asc(articles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to search articles")?;

        Self::map_all(rows)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn insert(&self, article: &Article) -> Result<SlugWrite> {
        let active = Self::to_active_model(article)?;

        match Articles::insert(active).exec_without_returning(&self.conn).await {
            Ok(_) => Ok(SlugWrite::Written),
            Err(e) if Self::is_slug_conflict(&e) => Ok(SlugWrite::SlugTaken),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert article")),
        }
    }

    /// Overwrites every mutable column of an existing row.
    ///
    /// Returns `None` when no row has the article's id.
    pub async fn update(&self, article: &Article) -> Result<Option<SlugWrite>> {
        let mut active = Self::to_active_model(article)?;
        // Identity and creation time are never rewritten.
        active.published_at = sea_orm::ActiveValue::NotSet;

        let result = Articles::update_many()
            .set(active)
            .filter(articles::Column::Id.eq(article.id.as_str()))
            .exec(&self.conn)
            .await;

        match result {
            Ok(res) if res.rows_affected == 0 => Ok(None),
            Ok(_) => Ok(Some(SlugWrite::Written)),
            Err(e) if Self::is_slug_conflict(&e) => Ok(Some(SlugWrite::SlugTaken)),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to update article")),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = Articles::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await
            .context("Failed to delete article")?;
        Ok(result.rows_affected > 0)
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    fn article(id: &str, slug: &str) -> Article {
        Article {
            id: ArticleId::from(id),
            slug: slug.to_string(),
            title: "Gene Editing".to_string(),
            excerpt: "Summary".to_string(),
            content: "word".to_string(),
            author: "A".to_string(),
            category: Category::Research,
            tags: vec!["crispr".to_string()],
            image_url: None,
            video_url: None,
            featured: false,
            status: ArticleStatus::Published,
            read_time: 1,
            published_at: "2025-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000000Z".to_string(),
        }
    }

    async fn repo() -> ArticleRepository {
        let store = Store::new("sqlite::memory:").await.unwrap();
        ArticleRepository::new(store.conn.clone())
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_insert_duplicate_slug_is_reported() {
        let repo = repo().await;

        assert_eq!(
            repo.insert(&article("a", "gene-editing")).await.unwrap(),
            SlugWrite::Written
        );
        assert_eq!(
            repo.insert(&article("b", "gene-editing")).await.unwrap(),
            SlugWrite::SlugTaken
        );
        assert!(repo.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_onto_taken_slug_is_reported() {
        let repo = repo().await;
        repo.insert(&article("a", "gene-editing")).await.unwrap();
        repo.insert(&article("b", "protein-folding")).await.unwrap();

        let mut moved = article("b", "gene-editing");
        moved.title = "Moved".to_string();
        assert_eq!(
            repo.update(&moved).await.unwrap(),
            Some(SlugWrite::SlugTaken)
        );

        let stored = repo.get("b").await.unwrap().unwrap();
        assert_eq!(stored.slug, "protein-folding");
        assert_eq!(stored.title, "Gene Editing");

        assert_eq!(repo.update(&article("missing", "x")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_tags_are_an_error() {
        let repo = repo().await;
        repo.insert(&article("a", "gene-editing")).await.unwrap();

        Articles::update_many()
            .col_expr(articles::Column::Tags, Expr::value("not json"))
            .filter(articles::Column::Id.eq("a"))
            .exec(&repo.conn)
            .await
            .unwrap();

        let err = repo.get("a").await.unwrap_err();
        assert!(format!("{err:#}").contains("Corrupt tags on article a"));
    }
}
