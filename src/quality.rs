// src/quality.rs
//! Quality gate: minimum body length plus a handful of spam heuristics.
//! Checks run in order and short-circuit per record.

use tracing::{debug, info};

use crate::article::Article;

pub const DEFAULT_MIN_WORD_COUNT: usize = 200;

/// Spam phrases matched case-insensitively as substrings of the title.
const SPAM_PHRASES: &[&str] = &[
    "click here",
    "buy now",
    "limited time",
    "act now",
    "congratulations",
    "you won",
    "free money",
];

#[derive(Debug, Clone)]
pub struct QualityFilter {
    pub min_word_count: usize,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORD_COUNT)
    }
}

impl QualityFilter {
    pub fn new(min_word_count: usize) -> Self {
        Self { min_word_count }
    }

    pub fn filter(&self, articles: Vec<Article>) -> Vec<Article> {
        if articles.is_empty() {
            return Vec::new();
        }

        let total = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter(|a| self.accepts(a))
            .collect();

        info!(
            removed = total - kept.len(),
            kept = kept.len(),
            "quality-filtered articles"
        );
        kept
    }

    fn accepts(&self, article: &Article) -> bool {
        let words = article.word_count();
        if words < self.min_word_count {
            debug!(title = %article.title, words, "too short");
            return false;
        }
        if is_spam_title(&article.title) {
            debug!(title = %article.title, "spam title");
            return false;
        }
        true
    }
}

fn is_spam_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    if SPAM_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }

    // Shouty all-caps headlines longer than 10 chars.
    let has_letters = title.chars().any(|c| c.is_alphabetic());
    if has_letters
        && title.chars().count() > 10
        && !title.chars().any(|c| c.is_lowercase())
    {
        return true;
    }

    false
}
