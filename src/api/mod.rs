use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{ArticleService, AuthService, ImageService};
use crate::state::SharedState;

mod admin;
mod articles;
pub mod auth;
mod error;
mod observability;
mod pages;
mod public;
mod types;
mod upload;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Headroom over `uploads.max_bytes` for the multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn article_service(&self) -> &Arc<dyn ArticleService> {
        &self.shared.article_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn image_service(&self) -> &Arc<ImageService> {
        &self.shared.image_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

/// Opens the database, seeds the bootstrap admin and builds the state.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    shared.ensure_bootstrap_admin().await?;
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let cors_origins = config.server.cors_allowed_origins.clone();
    let upload_dir = config.uploads.directory.clone();
    let upload_prefix = format!("/{}", config.uploads.url_prefix.trim_matches('/'));
    let body_limit = state.image_service().max_bytes() + MULTIPART_OVERHEAD;

    let api_router = Router::new()
        .merge(create_protected_router(state.clone(), body_limit))
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route("/public/articles", get(public::list_published))
        .route("/public/articles/{slug}", get(public::get_published))
        .route("/health", get(observability::get_health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .with_state(state.clone());

    let admin_router = Router::new()
        .route("/admin", get(pages::admin_dashboard))
        .route(
            "/admin/login",
            get(pages::admin_login).post(admin::login_submit),
        )
        .route(
            "/admin/logout",
            get(pages::admin_not_found).post(admin::logout_submit),
        )
        .route(
            "/admin/articles",
            get(admin::articles_redirect).post(admin::create_submit),
        )
        .route(
            "/admin/articles/{id}",
            get(admin::edit_page).post(admin::update_submit),
        )
        .route(
            "/admin/articles/{id}/delete",
            get(pages::admin_not_found).post(admin::delete_submit),
        )
        .route("/admin/{*rest}", get(pages::admin_not_found))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_gate,
        ))
        .with_state(state.clone());

    let site_router = Router::new()
        .route("/", get(pages::home))
        .route("/articles", get(pages::articles_index))
        .route("/articles/{slug}", get(pages::article_page))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .merge(admin_router)
        .merge(site_router)
        .nest_service(&upload_prefix, ServeDir::new(upload_dir))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>, body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/articles", post(articles::create_article))
        .route(
            "/articles/{id}",
            axum::routing::put(articles::update_article).delete(articles::delete_article),
        )
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/change-password", post(auth::change_password))
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
