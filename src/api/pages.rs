//! Server-rendered pages: the reader site and the admin shells.
//!
//! All caller-controlled text goes through `html_escape`. Article bodies are
//! admin-authored HTML and are emitted unchanged.

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

use super::{ApiError, AppState, public::find_published};
use crate::domain::text::{format_read_time, truncate_text};
use crate::domain::{ArticleStatus, Category};
use crate::models::{AdminUser, Article, ArticleQuery};

const CARD_EXCERPT_CHARS: usize = 180;

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesPageQuery {
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let articles = state.article_service().list_published().await?;
    let site = &state.config().server.site_name;

    let (featured, rest): (Vec<&Article>, Vec<&Article>) =
        articles.iter().partition(|a| a.featured);

    let mut body = String::new();
    if !featured.is_empty() {
        body.push_str("<section class=\"featured\"><h2>Featured</h2>");
        body.push_str(&card_grid(&featured));
        body.push_str("</section>");
    }
    body.push_str("<section class=\"latest\"><h2>Latest</h2>");
    body.push_str(&card_grid(&rest));
    body.push_str("</section>");

    Ok(Html(layout(site, site, &body)))
}

/// GET /articles
pub async fn articles_index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticlesPageQuery>,
) -> Result<Html<String>, ApiError> {
    let category = params
        .category
        .as_deref()
        .and_then(|c| c.parse::<Category>().ok());

    let articles = state
        .article_service()
        .search(&ArticleQuery {
            text: None,
            category,
            status: Some(ArticleStatus::Published),
        })
        .await?;

    let mut body = String::from("<nav class=\"categories\"><a href=\"/articles\">All</a>");
    for c in Category::ALL {
        let _ = write!(
            body,
            " <a href=\"/articles?category={}\">{}</a>",
            attr(c.as_str()),
            text(c.as_str())
        );
    }
    body.push_str("</nav>");
    body.push_str(&card_grid(&articles.iter().collect::<Vec<_>>()));

    let title = category.map_or_else(|| "All articles".to_string(), |c| c.to_string());
    Ok(Html(layout(&state.config().server.site_name, &title, &body)))
}

/// GET /articles/{slug}
pub async fn article_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let site = &state.config().server.site_name;

    let Some(article) = find_published(&state, &slug).await? else {
        return Ok(not_found_page(site));
    };

    Ok(Html(layout(site, &article.title, &render_article(&article))).into_response())
}

/// GET /admin
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
) -> Result<Html<String>, ApiError> {
    let articles = state.article_service().list_all().await?;
    let counts = DashboardCounts::of(&articles);

    let mut body = format!(
        "<p class=\"whoami\">Signed in as {}</p>\
         <form method=\"post\" action=\"/admin/logout\"><button type=\"submit\">Sign out</button></form>",
        text(&user.email)
    );
    let _ = write!(
        body,
        "<ul class=\"stats\"><li>Total <strong>{}</strong></li><li>Published <strong>{}</strong></li>\
         <li>Drafts <strong>{}</strong></li><li>Featured <strong>{}</strong></li></ul>",
        articles.len(),
        counts.published,
        counts.drafts,
        counts.featured,
    );
    body.push_str("<h2>New article</h2>");
    body.push_str(&article_form("/admin/articles", None));
    body.push_str(
        "<table class=\"articles\"><thead><tr><th>Title</th><th>Category</th>\
         <th>Status</th><th>Published</th><th></th></tr></thead><tbody>",
    );
    for a in &articles {
        let _ = write!(
            body,
            "<tr><td><a href=\"/articles/{slug}\">{title}</a></td><td>{category}</td><td>{status}</td><td>{date}</td>\
             <td><a href=\"/admin/articles/{id}\">Edit</a> \
             <form method=\"post\" action=\"/admin/articles/{id}/delete\"><button type=\"submit\">Delete</button></form></td></tr>",
            slug = attr(&a.slug),
            title = text(&a.title),
            category = text(a.category.as_str()),
            status = text(a.status.as_str()),
            date = text(&display_date(&a.published_at)),
            id = attr(a.id.as_str()),
        );
    }
    body.push_str("</tbody></table>");

    Ok(Html(layout(
        &state.config().server.site_name,
        "Dashboard",
        &body,
    )))
}

/// GET /admin/login
pub async fn admin_login(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(login_page(&state.config().server.site_name, None))
}

/// Fallback for unknown `/admin/...` paths once the gate let the request through.
pub async fn admin_not_found(State(state): State<Arc<AppState>>) -> Response {
    not_found_page(&state.config().server.site_name)
}

// ============================================================================
// Rendering
// ============================================================================

pub(super) fn layout(site_name: &str, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | {site}</title></head><body>\
         <header><a class=\"brand\" href=\"/\">{site}</a> <a href=\"/articles\">Articles</a></header>\
         <main>{body}</main></body></html>",
        title = text(title),
        site = text(site_name),
    )
}

pub(super) fn not_found_page(site_name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(layout(
            site_name,
            "Not found",
            "<h1>Article not found</h1><p><a href=\"/articles\">Browse all articles</a></p>",
        )),
    )
        .into_response()
}

/// Calendar date of a stored timestamp, e.g. `March 4, 2025`.
fn display_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map_or_else(|_| timestamp.to_string(), |d| d.format("%B %-d, %Y").to_string())
}

fn card_grid(articles: &[&Article]) -> String {
    if articles.is_empty() {
        return "<p class=\"empty\">No articles yet.</p>".to_string();
    }

    let mut html = String::from("<div class=\"cards\">");
    for article in articles {
        html.push_str(&render_card(article));
    }
    html.push_str("</div>");
    html
}

fn render_card(a: &Article) -> String {
    let mut html = String::from("<article class=\"card\">");
    if let Some(image) = &a.image_url {
        let _ = write!(html, "<img src=\"{}\" alt=\"{}\">", attr(image), attr(&a.title));
    }
    let _ = write!(
        html,
        "<div class=\"meta\"><time>{}</time> <span class=\"category\">{}</span>",
        text(&display_date(&a.published_at)),
        text(a.category.as_str()),
    );
    if a.featured {
        html.push_str(" <span class=\"badge\">Featured</span>");
    }
    let _ = write!(
        html,
        "</div><h3><a href=\"/articles/{slug}\">{title}</a></h3><p>{excerpt}</p>\
         <div class=\"byline\">{author} &middot; {read}</div></article>",
        slug = attr(&a.slug),
        title = text(&a.title),
        excerpt = text(&truncate_text(&a.excerpt, CARD_EXCERPT_CHARS)),
        author = text(&a.author),
        read = text(&format_read_time(a.read_time)),
    );
    html
}

fn render_article(a: &Article) -> String {
    let mut html = format!(
        "<article class=\"full\"><div class=\"meta\"><span class=\"category\">{}</span> \
         <time>{}</time></div><h1>{}</h1><p class=\"lead\">{}</p>\
         <div class=\"byline\">By {} &middot; {}</div>",
        text(a.category.as_str()),
        text(&display_date(&a.published_at)),
        text(&a.title),
        text(&a.excerpt),
        text(&a.author),
        text(&format_read_time(a.read_time)),
    );
    if let Some(image) = &a.image_url {
        let _ = write!(html, "<img src=\"{}\" alt=\"{}\">", attr(image), attr(&a.title));
    }
    if let Some(video) = &a.video_url {
        let _ = write!(
            html,
            "<video controls src=\"{}\"></video>",
            attr(video)
        );
    }
    let _ = write!(html, "<div class=\"content\">{}</div>", a.content);
    if !a.tags.is_empty() {
        html.push_str("<ul class=\"tags\">");
        for tag in &a.tags {
            let _ = write!(html, "<li>{}</li>", text(tag));
        }
        html.push_str("</ul>");
    }
    html.push_str("</article>");
    html
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DashboardCounts {
    published: usize,
    drafts: usize,
    featured: usize,
}

impl DashboardCounts {
    fn of(articles: &[Article]) -> Self {
        let mut counts = Self::default();
        for a in articles {
            match a.status {
                ArticleStatus::Published => counts.published += 1,
                ArticleStatus::Draft => counts.drafts += 1,
            }
            if a.featured {
                counts.featured += 1;
            }
        }
        counts
    }
}

pub(super) fn login_page(site_name: &str, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Admin login</h1>");
    if let Some(error) = error {
        let _ = write!(body, "<p class=\"error\">{}</p>", text(error));
    }
    body.push_str(
        "<form class=\"login\" method=\"post\" action=\"/admin/login\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Sign in</button></form>",
    );
    layout(site_name, "Admin login", &body)
}

/// Edit screen for one article.
pub(super) fn edit_article_page(site_name: &str, article: &Article) -> String {
    let body = format!(
        "<h1>Edit article</h1><p><a href=\"/admin\">Back to dashboard</a></p>{}",
        article_form(&format!("/admin/articles/{}", article.id), Some(article))
    );
    layout(site_name, "Edit article", &body)
}

/// Page shown when a submitted form is rejected.
pub(super) fn form_error_page(site_name: &str, message: &str) -> String {
    let body = format!(
        "<h1>Could not save</h1><p class=\"error\">{}</p><p><a href=\"/admin\">Back to dashboard</a></p>",
        text(message)
    );
    layout(site_name, "Could not save", &body)
}

/// Authoring form, blank for a new article or filled from `article`.
/// New articles start as drafts here.
fn article_form(action: &str, article: Option<&Article>) -> String {
    let value = |f: fn(&Article) -> &str| article.map_or("", f);
    let selected = |on: bool| if on { " selected" } else { "" };

    let mut categories = String::new();
    for c in Category::ALL {
        let _ = write!(
            categories,
            "<option{}>{}</option>",
            selected(article.is_some_and(|a| a.category == c)),
            text(c.as_str())
        );
    }

    let current_status = article.map_or(ArticleStatus::FORM_DEFAULT, |a| a.status);
    let mut statuses = String::new();
    for s in [ArticleStatus::Draft, ArticleStatus::Published] {
        let _ = write!(
            statuses,
            "<option value=\"{s}\"{}>{s}</option>",
            selected(s == current_status)
        );
    }

    let tags = article.map(|a| a.tags.join(", ")).unwrap_or_default();
    let featured = if article.is_some_and(|a| a.featured) {
        " checked"
    } else {
        ""
    };
    let button = if article.is_some() { "Save" } else { "Create" };

    format!(
        "<form class=\"article-form\" method=\"post\" action=\"{action}\">\
         <input name=\"title\" placeholder=\"Title\" value=\"{title}\" required>\
         <input name=\"excerpt\" placeholder=\"Excerpt\" value=\"{excerpt}\" required>\
         <textarea name=\"content\" required>{content}</textarea>\
         <input name=\"author\" placeholder=\"Author\" value=\"{author}\" required>\
         <select name=\"category\">{categories}</select>\
         <input name=\"tags\" placeholder=\"Tags, comma separated\" value=\"{tags}\">\
         <input name=\"image_url\" placeholder=\"Image URL\" value=\"{image}\">\
         <input name=\"video_url\" placeholder=\"Video URL\" value=\"{video}\">\
         <label><input type=\"checkbox\" name=\"featured\"{featured}> Featured</label>\
         <select name=\"status\">{statuses}</select>\
         <button type=\"submit\">{button}</button></form>",
        action = attr(action),
        title = attr(value(|a| &a.title)),
        excerpt = attr(value(|a| &a.excerpt)),
        content = text(value(|a| &a.content)),
        author = attr(value(|a| &a.author)),
        tags = attr(&tags),
        image = attr(value(|a| a.image_url.as_deref().unwrap_or(""))),
        video = attr(value(|a| a.video_url.as_deref().unwrap_or(""))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArticleId;

    fn article() -> Article {
        Article {
            id: ArticleId::from("1"),
            slug: "crispr-breakthrough".into(),
            title: "CRISPR <Breakthrough>".into(),
            excerpt: "Gene & cell".into(),
            content: "<p>Body</p>".into(),
            author: "A".into(),
            category: Category::Research,
            tags: vec!["<tag>".into()],
            image_url: None,
            video_url: None,
            featured: true,
            status: ArticleStatus::Published,
            read_time: 2,
            published_at: "2025-03-04T10:00:00.000000Z".into(),
            updated_at: "2025-03-04T10:00:00.000000Z".into(),
        }
    }

    #[test]
    fn test_card_escapes_text() {
        let html = render_card(&article());
        assert!(html.contains("CRISPR &lt;Breakthrough&gt;"));
        assert!(html.contains("Gene &amp; cell"));
        assert!(html.contains("2 min read"));
        assert!(html.contains("Featured"));
        assert!(html.contains("March 4, 2025"));
        assert!(html.contains("href=\"/articles/crispr-breakthrough\""));
    }

    #[test]
    fn test_article_body_is_not_escaped() {
        let html = render_article(&article());
        assert!(html.contains("<div class=\"content\"><p>Body</p></div>"));
        assert!(html.contains("<li>&lt;tag&gt;</li>"));
    }

    #[test]
    fn test_form_preselects_draft() {
        let html = article_form("/admin/articles", None);
        assert!(html.contains("<option value=\"draft\" selected>draft</option>"));
        assert!(html.contains("action=\"/admin/articles\""));
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let a = article();
        let html = article_form("/admin/articles/1", Some(&a));
        assert!(html.contains("value=\"CRISPR &lt;Breakthrough&gt;\""));
        assert!(html.contains("<option selected>Research</option>"));
        assert!(html.contains("<option value=\"published\" selected>published</option>"));
        assert!(html.contains("name=\"featured\" checked"));
        assert!(html.contains("&lt;p&gt;Body&lt;/p&gt;</textarea>"));
    }

    #[test]
    fn test_dashboard_counts() {
        let mut draft = article();
        draft.status = ArticleStatus::Draft;
        draft.featured = false;
        let counts = DashboardCounts::of(&[article(), draft, article()]);
        assert_eq!(
            counts,
            DashboardCounts {
                published: 2,
                drafts: 1,
                featured: 2,
            }
        );
    }

    #[test]
    fn test_display_date_falls_back_to_raw() {
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
