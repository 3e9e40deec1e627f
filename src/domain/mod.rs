//! Domain types for the newsroom with strong typing.
//!
//! Newtype identifiers keep article and admin ids from being mixed up, and the
//! closed vocabularies (category, publication status) are enums rather than
//! free-form strings so an unknown value is rejected at the boundary.

pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, immutable identifier of an article.
///
/// Generated once at creation (UUID v4) and never derived from content.
///
/// ```rust
/// use nurtal::domain::ArticleId;
///
/// let id = ArticleId::generate();
/// assert_eq!(id.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of an admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// Editorial section an article is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    Biotechnology,
    Research,
    Innovation,
    Startup,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Ai,
        Self::Biotechnology,
        Self::Research,
        Self::Innovation,
        Self::Startup,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::Biotechnology => "Biotechnology",
            Self::Research => "Research",
            Self::Innovation => "Innovation",
            Self::Startup => "Startup",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for Category {
    type Err = UnknownValue;

    /// Exact, case-sensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Publication state. Only `Published` articles are visible on the reader site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    #[default]
    Published,
}

impl ArticleStatus {
    /// Status assumed when a client creates an article through the JSON API
    /// without naming one.
    pub const API_DEFAULT: Self = Self::Published;

    /// Status preselected by the authoring form.
    pub const FORM_DEFAULT: Self = Self::Draft;

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(UnknownValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_display_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn category_rejects_unknown_and_wrong_case() {
        assert!("Politics".parse::<Category>().is_err());
        assert!("ai".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_display_name() {
        assert_eq!(serde_json::to_string(&Category::Ai).unwrap(), "\"AI\"");
        let parsed: Category = serde_json::from_str("\"Startup\"").unwrap();
        assert_eq!(parsed, Category::Startup);
    }

    #[test]
    fn status_defaults_differ_between_api_and_form() {
        assert_eq!(ArticleStatus::API_DEFAULT, ArticleStatus::Published);
        assert_eq!(ArticleStatus::FORM_DEFAULT, ArticleStatus::Draft);
        assert_eq!(ArticleStatus::default(), ArticleStatus::API_DEFAULT);
    }

    #[test]
    fn status_parsing() {
        assert_eq!("draft".parse::<ArticleStatus>().unwrap(), ArticleStatus::Draft);
        assert_eq!(
            "published".parse::<ArticleStatus>().unwrap(),
            ArticleStatus::Published
        );
        let err = "archived".parse::<ArticleStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'archived'");
    }

    #[test]
    fn article_id_is_unique_per_generation() {
        assert_ne!(ArticleId::generate(), ArticleId::generate());
        assert_eq!(ArticleId::from("abc").to_string(), "abc");
    }
}
