//! Form posts from the server-rendered admin pages.
//!
//! Every action answers with a 303 back to a page, so a browser without
//! scripts can drive the whole dashboard.

use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth::{DASHBOARD_PAGE, LOGIN_PAGE, clear_session_cookie, session_cookie, session_token};
use super::{ApiError, AppState, ArticleForm, LoginRequest, pages, validation::validate_credentials};
use crate::domain::ArticleId;
use crate::services::{ArticleError, AuthError};

fn site_name(state: &AppState) -> &str {
    &state.config().server.site_name
}

fn rejected(state: &AppState, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(pages::form_error_page(site_name(state), message)),
    )
        .into_response()
}

/// Validation failures re-render a page; everything else goes through `ApiError`.
fn article_failure(state: &AppState, err: ArticleError) -> Response {
    match err {
        ArticleError::Validation(msg) => rejected(state, &msg),
        ArticleError::NotFound(_) => pages::not_found_page(site_name(state)),
        other => ApiError::from(other).into_response(),
    }
}

/// POST /admin/login
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;

    let (status, message) = match validate_credentials(&form.email, &form.password) {
        Err(_) => (StatusCode::BAD_REQUEST, "Email and password are required"),
        Ok((email, password)) => match state.auth_service().authenticate(email, password).await {
            Ok(result) => {
                let config = state.config();
                let cookie = session_cookie(
                    &result.token,
                    config.security.session_ttl_hours,
                    config.server.secure_cookies,
                );
                return Ok(([(header::SET_COOKIE, cookie)], Redirect::to(DASHBOARD_PAGE))
                    .into_response());
            }
            Err(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            Err(e) => return Err(e.into()),
        },
    };

    Ok((
        status,
        Html(pages::login_page(site_name(&state), Some(message))),
    )
        .into_response())
}

/// POST /admin/logout
pub async fn logout_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        state.auth_service().logout(&token).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to(LOGIN_PAGE),
    )
        .into_response())
}

/// GET /admin/articles
pub async fn articles_redirect() -> Redirect {
    Redirect::to(DASHBOARD_PAGE)
}

/// POST /admin/articles
pub async fn create_submit(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ArticleForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    match state.article_service().create(form.into()).await {
        Ok(_) => Ok(Redirect::to(DASHBOARD_PAGE).into_response()),
        Err(e) => Ok(article_failure(&state, e)),
    }
}

/// GET /admin/articles/{id}
pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.article_service().get_by_id(&ArticleId::from(id)).await {
        Ok(article) => {
            Ok(Html(pages::edit_article_page(site_name(&state), &article)).into_response())
        }
        Err(e) => Ok(article_failure(&state, e)),
    }
}

/// POST /admin/articles/{id}
pub async fn update_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: Result<Form<ArticleForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    match state
        .article_service()
        .update(&ArticleId::from(id), form.into())
        .await
    {
        Ok(_) => Ok(Redirect::to(DASHBOARD_PAGE).into_response()),
        Err(e) => Ok(article_failure(&state, e)),
    }
}

/// POST /admin/articles/{id}/delete
/// Deleting an article that is already gone still lands on the dashboard.
pub async fn delete_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.article_service().delete(&ArticleId::from(id)).await?;
    Ok(Redirect::to(DASHBOARD_PAGE))
}
