use serde::{Deserialize, Serialize};

use crate::domain::{ArticleId, ArticleStatus, Category};

/// A stored article as returned by the article service and the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub featured: bool,
    pub status: ArticleStatus,
    pub read_time: i32,
    pub published_at: String,
    pub updated_at: String,
}

impl Article {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

/// Caller-supplied fields for a new article, not yet validated.
///
/// `category` and `status` stay textual here so that an unknown value is
/// reported as a validation failure naming the field.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub featured: bool,
    pub status: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
///
/// There is deliberately no way to express a new id, slug, read time or
/// publication timestamp.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    /// An empty string clears the image.
    pub image_url: Option<String>,
    /// An empty string clears the video.
    pub video_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<String>,
}

/// Search criteria; every `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub status: Option<ArticleStatus>,
}
