//! Text derivations for articles: slugs and reading time.

use regex::Regex;
use std::sync::OnceLock;

pub const WORDS_PER_MINUTE: usize = 200;

/// Slug used when a title contains no ASCII letters or digits at all.
pub const FALLBACK_SLUG: &str = "article";

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Lower-cases the title and collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen, trimming hyphens at both ends.
#[must_use]
pub fn generate_slug(title: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"[^a-z0-9]+");

    let lowered = title.to_lowercase();
    let slug = re.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Picks `base`, or the first of `base-1`, `base-2`, ... for which `is_taken`
/// returns false.
pub fn resolve_unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Removes anything that looks like a markup tag.
#[must_use]
pub fn strip_tags(content: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"<[^>]*>");
    re.replace_all(content, " ").into_owned()
}

#[must_use]
pub fn word_count(content: &str) -> usize {
    strip_tags(content).split_whitespace().count()
}

/// Estimated minutes to read `content`, rounded up.
///
/// Empty content reads in 0 minutes; any other content in at least 1.
#[must_use]
pub fn calculate_read_time(content: &str) -> i32 {
    if content.trim().is_empty() {
        return 0;
    }

    let minutes = word_count(content).div_ceil(WORDS_PER_MINUTE).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[must_use]
pub fn format_read_time(minutes: i32) -> String {
    match minutes {
        m if m < 1 => "Less than 1 min read".to_string(),
        1 => "1 min read".to_string(),
        m => format!("{m} min read"),
    }
}

/// Truncates on a character boundary and appends an ellipsis when shortened.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}
