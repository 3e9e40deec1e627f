use super::{ApiError, ArticleListQuery};
use crate::domain::{ArticleStatus, Category};
use crate::models::ArticleQuery;
use std::str::FromStr;

/// `None`, blank and `all` all mean "no filter".
fn optional_filter<T: FromStr>(value: Option<&str>, field: &str) -> Result<Option<T>, ApiError> {
    match value.map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("Invalid {field}: '{v}'"))),
    }
}

pub fn parse_article_query(query: &ArticleListQuery) -> Result<ArticleQuery, ApiError> {
    Ok(ArticleQuery {
        text: query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        category: optional_filter::<Category>(query.category.as_deref(), "category")?,
        status: optional_filter::<ArticleStatus>(query.status.as_deref(), "status")?,
    })
}

pub fn validate_credentials<'a>(email: &'a str, password: &'a str) -> Result<(&'a str, &'a str), ApiError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    Ok((email, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: Option<&str>, category: Option<&str>, status: Option<&str>) -> ArticleListQuery {
        ArticleListQuery {
            q: q.map(str::to_string),
            category: category.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_article_query() {
        let parsed = parse_article_query(&query(Some("  crispr "), Some("AI"), Some("draft"))).unwrap();
        assert_eq!(parsed.text.as_deref(), Some("crispr"));
        assert_eq!(parsed.category, Some(Category::Ai));
        assert_eq!(parsed.status, Some(ArticleStatus::Draft));
    }

    #[test]
    fn test_all_means_no_filter() {
        let parsed = parse_article_query(&query(Some(""), Some("all"), Some("all"))).unwrap();
        assert_eq!(parsed, ArticleQuery::default());
    }

    #[test]
    fn test_unknown_filters_rejected() {
        assert!(parse_article_query(&query(None, Some("Sports"), None)).is_err());
        assert!(parse_article_query(&query(None, None, Some("archived"))).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("a@b.c", "pw").is_ok());
        assert!(validate_credentials("  ", "pw").is_err());
        assert!(validate_credentials("a@b.c", "").is_err());
    }
}
