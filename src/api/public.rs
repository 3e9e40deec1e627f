use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::Article;
use crate::services::ArticleError;

/// Published article by slug. Drafts are reported as missing.
pub async fn find_published(state: &AppState, slug: &str) -> Result<Option<Article>, ApiError> {
    match state.article_service().get_by_slug(slug).await {
        Ok(article) if article.is_published() => Ok(Some(article)),
        Ok(_) | Err(ArticleError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// GET /public/articles
pub async fn list_published(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = state.article_service().list_published().await?;
    Ok(Json(ApiResponse::success(articles)))
}

/// GET /public/articles/{slug}
pub async fn get_published(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = find_published(&state, &slug)
        .await?
        .ok_or_else(ApiError::article_not_found)?;
    Ok(Json(ApiResponse::success(article)))
}
