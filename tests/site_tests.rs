mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;
use serde_json::json;

fn location(response: &axum::http::Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_admin_requires_login() {
    let app = spawn_app().await;

    let response = send(&app, get("/admin", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let response = send(&app, get("/admin/articles/new", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // A stale cookie is cleared on the way to the login page.
    let response = send(&app, get("/admin", Some("admin_session=expired"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(cookie_pair(&response), "admin_session=");

    let response = send(&app, get("/admin/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/api/auth/login\""));
}

#[tokio::test]
async fn test_admin_pages_when_signed_in() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = send(&app, get("/admin/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let mut draft = article_body("Unreleased Findings");
    draft["status"] = json!("draft");
    create_article(&app, &cookie, &draft).await;

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(ADMIN_EMAIL));
    assert!(html.contains("Unreleased Findings"));
    assert!(html.contains("draft"));

    let response = send(&app, get("/admin/nowhere", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_pages() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let mut featured = article_body("Featured <Discovery>");
    featured["featured"] = json!(true);
    create_article(&app, &cookie, &featured).await;

    let mut ai = article_body("Model Training Costs");
    ai["category"] = json!("AI");
    create_article(&app, &cookie, &ai).await;

    let mut draft = article_body("Secret Draft");
    draft["status"] = json!("draft");
    create_article(&app, &cookie, &draft).await;

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Featured &lt;Discovery&gt;"));
    assert!(html.contains("Model Training Costs"));
    assert!(!html.contains("Secret Draft"));

    let response = send(&app, get("/articles?category=AI", None)).await;
    let html = body_text(response).await;
    assert!(html.contains("Model Training Costs"));
    assert!(!html.contains("Featured &lt;Discovery&gt;"));

    let response = send(&app, get("/articles/featured-discovery", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<p>Gene editing reaches the clinic.</p>"));

    let response = send(&app, get("/articles/secret-draft", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Article not found"));
}

#[tokio::test]
async fn test_security_headers() {
    let app = spawn_app().await;

    let response = send(&app, get("/", None)).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("content-security-policy").is_some());
    assert!(headers.get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/api/public/articles")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn multipart_request(cookie: Option<&str>, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "nurtal-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_upload_image() {
    let app = spawn_app().await;
    let cookie = login(&app).await;
    let png = png_bytes(2400, 1000);

    let response = send(&app, multipart_request(None, "lab.png", "image/png", &png)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        multipart_request(Some(&cookie), "Lab Photo.png", "image/png", &png),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    let url = data["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));

    let response = send(&app, get(&url, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let stored = image::load_from_memory(&bytes).unwrap();
    assert_eq!((stored.width(), stored.height()), (1200, 500));
}

#[tokio::test]
async fn test_upload_rejects_bad_files() {
    let mut config = test_config();
    config.uploads.max_bytes = 1024;
    let app = spawn_app_with(config).await;
    let cookie = login(&app).await;

    let response = send(
        &app,
        multipart_request(Some(&cookie), "notes.txt", "text/plain", b"hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid file type. Only JPEG, PNG, and WebP are allowed."
    );

    let big = vec![0u8; 4096];
    let response = send(
        &app,
        multipart_request(Some(&cookie), "big.png", "image/png", &big),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("File too large"));
}

fn form_request(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_login_form() {
    let app = spawn_app().await;

    let response = send(
        &app,
        form_request("/admin/login", None, "email=admin%40nurtal.local&password=wrong"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Invalid email or password"));

    let response = send(&app, form_request("/admin/login", None, "email=&password=")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        form_request(
            "/admin/login",
            None,
            "email=admin%40nurtal.local&password=admin123",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
    let cookie = cookie_pair(&response);

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, form_request("/admin/logout", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let response = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_article_forms() {
    let app = spawn_app().await;
    let cookie = login(&app).await;

    let response = send(
        &app,
        form_request(
            "/admin/articles",
            None,
            "title=Sneaky&excerpt=E&content=C&author=A&category=AI",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let response = send(
        &app,
        form_request(
            "/admin/articles",
            Some(&cookie),
            "title=Form+Written&excerpt=Short&content=Some+words&author=A&category=AI\
             &tags=ml%2C+biology&image_url=&video_url=&status=draft",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let response = send(&app, get("/api/articles", None)).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    let article = data[0].clone();
    assert_eq!(article["slug"], "form-written");
    assert_eq!(article["status"], "draft");
    assert_eq!(article["tags"], json!(["ml", "biology"]));
    assert_eq!(article["imageUrl"], serde_json::Value::Null);
    let id = article["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        form_request(
            "/admin/articles",
            Some(&cookie),
            "title=Missing+Bits&category=AI",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("excerpt is required"));

    let response = send(&app, get(&format!("/admin/articles/{id}"), Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("value=\"Form Written\""));

    let response = send(
        &app,
        form_request(
            &format!("/admin/articles/{id}"),
            Some(&cookie),
            "title=Form+Edited&excerpt=Short&content=Some+words&author=A&category=Research\
             &tags=&featured=on&status=published",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, get(&format!("/api/articles/{id}"), None)).await;
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["slug"], "form-edited");
    assert_eq!(updated["category"], "Research");
    assert_eq!(updated["featured"], true);
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["publishedAt"], article["publishedAt"]);

    let response = send(&app, get("/admin", Some(&cookie))).await;
    let html = body_text(response).await;
    assert!(html.contains("Published <strong>1</strong>"));
    assert!(html.contains("Drafts <strong>0</strong>"));
    assert!(html.contains("Featured <strong>1</strong>"));
    assert!(html.contains(&format!("action=\"/admin/articles/{id}/delete\"")));

    let response = send(
        &app,
        form_request(&format!("/admin/articles/{id}/delete"), Some(&cookie), ""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, get(&format!("/api/articles/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get(&format!("/admin/articles/{id}"), Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
