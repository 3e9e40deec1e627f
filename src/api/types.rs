use serde::{Deserialize, Serialize};

use crate::domain::ArticleStatus;
use crate::models::{AdminUser, ArticleChanges, NewArticle};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

/// Body of `POST /api/articles`. Missing fields arrive empty and are reported
/// by the article service.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(alias = "video_url")]
    pub video_url: Option<String>,
    pub featured: bool,
    pub status: Option<String>,
}

impl From<CreateArticleRequest> for NewArticle {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            title: req.title,
            excerpt: req.excerpt,
            content: req.content,
            author: req.author,
            category: req.category,
            tags: req.tags,
            image_url: req.image_url,
            video_url: req.video_url,
            featured: req.featured,
            status: req.status,
        }
    }
}

/// Body of `PUT /api/articles/{id}`. Unknown keys such as `id`, `slug`,
/// `readTime` or `publishedAt` are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(alias = "video_url")]
    pub video_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<String>,
}

impl From<UpdateArticleRequest> for ArticleChanges {
    fn from(req: UpdateArticleRequest) -> Self {
        Self {
            title: req.title,
            excerpt: req.excerpt,
            content: req.content,
            author: req.author,
            category: req.category,
            tags: req.tags,
            image_url: req.image_url,
            video_url: req.video_url,
            featured: req.featured,
            status: req.status,
        }
    }
}

/// Fields posted by the admin article form.
///
/// Tags arrive comma separated and the `featured` checkbox is only sent when
/// ticked. Blank media fields clear the stored value on edit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: String,
    pub image_url: String,
    pub video_url: String,
    pub featured: Option<String>,
    pub status: String,
}

impl ArticleForm {
    fn tag_list(&self) -> Vec<String> {
        self.tags.split(',').map(str::to_string).collect()
    }

    fn status_or_form_default(&self) -> String {
        let status = self.status.trim();
        if status.is_empty() {
            ArticleStatus::FORM_DEFAULT.to_string()
        } else {
            status.to_string()
        }
    }
}

impl From<ArticleForm> for NewArticle {
    fn from(form: ArticleForm) -> Self {
        let tags = form.tag_list();
        let status = Some(form.status_or_form_default());
        Self {
            title: form.title,
            excerpt: form.excerpt,
            content: form.content,
            author: form.author,
            category: form.category,
            tags,
            image_url: Some(form.image_url),
            video_url: Some(form.video_url),
            featured: form.featured.is_some(),
            status,
        }
    }
}

impl From<ArticleForm> for ArticleChanges {
    fn from(form: ArticleForm) -> Self {
        let tags = form.tag_list();
        let status = Some(form.status_or_form_default());
        Self {
            title: Some(form.title),
            excerpt: Some(form.excerpt),
            content: Some(form.content),
            author: Some(form.author),
            category: Some(form.category),
            tags: Some(tags),
            image_url: Some(form.image_url),
            video_url: Some(form.video_url),
            featured: Some(form.featured.is_some()),
            status,
        }
    }
}

/// Query of `GET /api/articles`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AdminUser,
    pub expires_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "new_password")]
    pub new_password: String,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: &'static str,
    pub uptime_seconds: u64,
}

// ============================================================================
// Uploads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub filename: String,
}
