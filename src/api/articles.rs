use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ArticleListQuery, CreateArticleRequest, MessageResponse,
    UpdateArticleRequest, validation::parse_article_query,
};
use crate::domain::ArticleId;
use crate::models::Article;

/// GET /articles
/// All articles, drafts included. `q`, `category` and `status` narrow the list.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleListQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let query = parse_article_query(&params)?;
    let service = state.article_service();

    let articles = if query == crate::models::ArticleQuery::default() {
        service.list_all().await?
    } else {
        service.search(&query).await?
    };

    Ok(Json(ApiResponse::success(articles)))
}

/// GET /articles/{id}
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = state
        .article_service()
        .get_by_id(&ArticleId::from(id))
        .await?;
    Ok(Json(ApiResponse::success(article)))
}

/// POST /articles
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Article>>), ApiError> {
    let Json(payload) = payload?;
    let article = state.article_service().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(article))))
}

/// PUT /articles/{id}
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let Json(payload) = payload?;
    let article = state
        .article_service()
        .update(&ArticleId::from(id), payload.into())
        .await?;
    Ok(Json(ApiResponse::success(article)))
}

/// DELETE /articles/{id}
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let removed = state
        .article_service()
        .delete(&ArticleId::from(id))
        .await?;

    if !removed {
        return Err(ApiError::article_not_found());
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Article deleted successfully",
    ))))
}
