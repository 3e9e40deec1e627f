use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use cookie::{Cookie, SameSite};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ChangePasswordRequest, LoginRequest, LoginResponse,
    MessageResponse, validation::validate_credentials,
};
use crate::models::AdminUser;

pub const SESSION_COOKIE: &str = "admin_session";

pub const LOGIN_PAGE: &str = "/admin/login";
pub const DASHBOARD_PAGE: &str = "/admin";

// ============================================================================
// Cookies
// ============================================================================

/// Session token from the `admin_session` cookie, or from an
/// `Authorization: Bearer <token>` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == SESSION_COOKIE && !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }

    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && !token.trim().is_empty()
    {
        return Some(token.trim().to_string());
    }

    None
}

pub(super) fn session_cookie(token: &str, ttl_hours: u32, secure: bool) -> HeaderValue {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(i64::from(ttl_hours)))
        .build();

    // Token is hex, so the rendered cookie is always a valid header value.
    HeaderValue::from_str(&cookie.to_string()).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .removal()
        .build();

    HeaderValue::from_str(&cookie.to_string()).unwrap_or_else(|_| HeaderValue::from_static(""))
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<AdminUser> {
    let token = session_token(headers)?;
    match state.auth_service().validate(&token).await {
        Ok(user) => Some(user),
        Err(crate::services::AuthError::Unauthorized) => None,
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            None
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects the request with 401 unless it carries a valid admin session.
/// The session's user is made available as `Extension<AdminUser>`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers()).ok_or_else(ApiError::unauthorized)?;
    let user = state.auth_service().validate(&token).await?;

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Gate for the `/admin` pages.
///
/// Anonymous visitors are sent to the login page (a stale cookie is cleared on
/// the way); signed-in admins visiting the login page go to the dashboard.
pub async fn admin_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let is_login_page = request.uri().path().trim_end_matches('/') == LOGIN_PAGE;
    let had_token = session_token(request.headers()).is_some();
    let user = current_user(&state, request.headers()).await;

    match (user, is_login_page) {
        (Some(_), true) => Redirect::to(DASHBOARD_PAGE).into_response(),
        (Some(user), false) => {
            tracing::Span::current().record("user_id", user.id.value());
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        (None, true) => next.run(request).await,
        (None, false) => {
            let mut response = Redirect::to(LOGIN_PAGE).into_response();
            if had_token {
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, clear_session_cookie());
            }
            response
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with email and password; sets the session cookie on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let (email, password) = validate_credentials(&payload.email, &payload.password)?;

    let result = state.auth_service().authenticate(email, password).await?;

    let config = state.config();
    let cookie = session_cookie(
        &result.token,
        config.security.session_ttl_hours,
        config.server.secure_cookies,
    );

    let body = ApiResponse::success(LoginResponse {
        user: result.user,
        expires_at: crate::db::format_timestamp(result.expires_at),
    });

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /auth/logout
/// Delete the server-side session and the cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        state.auth_service().logout(&token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::success(MessageResponse::new("Logged out"))),
    )
        .into_response())
}

/// GET /auth/me
pub async fn get_current_user(
    Extension(user): Extension<AdminUser>,
) -> Json<ApiResponse<AdminUser>> {
    Json(ApiResponse::success(user))
}

/// POST /auth/change-password
/// Every session of the user, this one included, is revoked
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    state
        .auth_service()
        .change_password(user.id, &payload.new_password)
        .await?;

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::success(MessageResponse::new(
            "Password updated successfully",
        ))),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; admin_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let value = session_cookie("deadbeef", 24, true);
        let rendered = value.to_str().unwrap();

        assert!(rendered.starts_with("admin_session=deadbeef"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=86400"));
        assert!(rendered.contains("Secure"));

        let insecure = session_cookie("deadbeef", 24, false);
        assert!(!insecure.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let rendered = clear_session_cookie().to_str().unwrap().to_string();
        assert!(rendered.starts_with("admin_session=;"));
        assert!(rendered.contains("Max-Age=0"));
    }
}
