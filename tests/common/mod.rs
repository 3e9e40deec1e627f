#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use nurtal::config::Config;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@nurtal.local";
pub const ADMIN_PASSWORD: &str = "admin123";

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.bootstrap_admin_email = ADMIN_EMAIL.to_string();
    config.security.bootstrap_admin_password = ADMIN_PASSWORD.to_string();
    config.uploads.directory = std::env::temp_dir()
        .join(format!("nurtal-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config.observability.metrics_enabled = false;
    config
}

pub async fn spawn_app_with(config: Config) -> Router {
    let state = nurtal::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    nurtal::api::router(state)
}

pub async fn spawn_app() -> Router {
    spawn_app_with(test_config()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the response's Set-Cookie header.
pub fn cookie_pair(response: &Response<Body>) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

/// Logs in as the bootstrap admin and returns the cookie to send back.
pub async fn login(app: &Router) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    cookie_pair(&response)
}

pub fn article_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "excerpt": "Short summary",
        "content": "<p>Gene editing reaches the clinic.</p>",
        "author": "Dr. Jane Doe",
        "category": "Biotechnology",
        "tags": ["crispr", "gene therapy"],
    })
}

pub async fn create_article(app: &Router, cookie: &str, body: &Value) -> Value {
    let response = send(app, json_request("POST", "/api/articles", Some(cookie), body)).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}
