// src/article.rs
//! Candidate article record plus the text helpers shared by the filtering
//! and scoring stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested article. `url` is the only stable identity: two records with
/// the same normalized URL are the same article regardless of title/content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Absent means the upstream fetcher could not parse a timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body_text: String,
    pub source: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unset until the relevance scorer runs.
    #[serde(default)]
    pub score: Option<f32>,
}

fn default_category() -> String {
    "general_tech".to_string()
}

impl Article {
    /// Whitespace-split token count of the body text.
    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }

    /// First `max_chars` of the normalized body text, used as the embedding
    /// excerpt and in quality scoring.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let normalized = normalize_text(&self.body_text);
        normalized.chars().take(max_chars).collect()
    }
}

/// Normalize feed-sourced text: decode HTML entities, strip tags, unify
/// typographic quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(body: &str) -> Article {
        Article {
            title: "t".into(),
            url: "https://example.com/a".into(),
            published_at: None,
            body_text: body.into(),
            source: "Example".into(),
            category: "general_tech".into(),
            author: None,
            image_url: None,
            score: None,
        }
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(article("one two\tthree\nfour").word_count(), 4);
        assert_eq!(article("").word_count(), 0);
    }

    #[test]
    fn normalize_strips_tags_and_entities() {
        let out = normalize_text("<p>Rust &amp; Tokio</p>  <br/>news");
        assert_eq!(out, "Rust & Tokio news");
    }

    #[test]
    fn excerpt_is_char_bounded() {
        let a = article("word ".repeat(100).as_str());
        assert!(a.excerpt(50).chars().count() <= 50);
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let json = r#"{"title":"T","url":"https://x.com/a","source":"X"}"#;
        let a: Article = serde_json::from_str(json).unwrap();
        assert_eq!(a.category, "general_tech");
        assert!(a.published_at.is_none());
        assert!(a.score.is_none());
    }
}
