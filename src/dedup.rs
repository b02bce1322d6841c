// src/dedup.rs
//! Duplicate removal: exact normalized-URL matches first, then fuzzy title
//! matches against everything accepted earlier in the same pass.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::article::Article;
use crate::similarity::{normalize_url, sequence_ratio};

pub const DEFAULT_TITLE_SIMILARITY_THRESHOLD: f32 = 0.85;

#[derive(Debug, Clone)]
pub struct Deduplicator {
    /// Similarity ratio in (0, 1]; titles at or above it count as duplicates.
    pub title_similarity_threshold: f32,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_SIMILARITY_THRESHOLD)
    }
}

impl Deduplicator {
    pub fn new(title_similarity_threshold: f32) -> Self {
        Self {
            title_similarity_threshold: title_similarity_threshold.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Single order-preserving pass. For each record: drop on a seen
    /// normalized URL, else drop when any previously accepted lowercased
    /// title reaches the similarity threshold, else accept and remember.
    pub fn deduplicate(&self, articles: Vec<Article>) -> Vec<Article> {
        if articles.is_empty() {
            return Vec::new();
        }

        let total = articles.len();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut seen_titles: Vec<String> = Vec::new();
        let mut unique = Vec::with_capacity(total);

        for article in articles {
            let normalized = normalize_url(&article.url);
            if seen_urls.contains(&normalized) {
                debug!(title = %article.title, "duplicate url");
                continue;
            }

            let title_lower = article.title.to_lowercase();
            if self.is_similar_title(&title_lower, &seen_titles) {
                debug!(title = %article.title, "similar title");
                continue;
            }

            seen_urls.insert(normalized);
            seen_titles.push(title_lower);
            unique.push(article);
        }

        info!(
            removed = total - unique.len(),
            kept = unique.len(),
            "deduplicated articles"
        );
        unique
    }

    fn is_similar_title(&self, title_lower: &str, seen: &[String]) -> bool {
        seen.iter()
            .any(|s| sequence_ratio(title_lower, s) >= self.title_similarity_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str) -> Article {
        Article {
            title: title.into(),
            url: url.into(),
            published_at: None,
            body_text: String::new(),
            source: "Test".into(),
            category: "general_tech".into(),
            author: None,
            image_url: None,
            score: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(Deduplicator::default().deduplicate(vec![]).is_empty());
    }

    #[test]
    fn same_url_different_query_keeps_first_only() {
        let out = Deduplicator::default().deduplicate(vec![
            article("First take", "https://x.com/a?ref=1"),
            article("Completely different headline", "https://x.com/a?ref=2"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "First take");
    }

    #[test]
    fn near_duplicate_titles_depend_on_threshold() {
        let input = || {
            vec![
                article("Apple Unveils New iPhone", "https://a.com/1"),
                article("Apple Unveils the New iPhone", "https://b.com/2"),
            ]
        };
        assert_eq!(Deduplicator::new(0.85).deduplicate(input()).len(), 1);
        assert_eq!(Deduplicator::new(0.99).deduplicate(input()).len(), 2);
    }

    #[test]
    fn exact_duplicate_titles_always_match() {
        let out = Deduplicator::new(1.0).deduplicate(vec![
            article("Same headline", "https://a.com/1"),
            article("Same headline", "https://b.com/2"),
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn preserves_order_of_first_occurrences_and_is_idempotent() {
        let dedup = Deduplicator::default();
        let out = dedup.deduplicate(vec![
            article("Alpha launches rockets", "https://a.com/1"),
            article("Beta ships compilers", "https://b.com/2"),
            article("Alpha launches rockets", "https://a.com/1"),
            article("Gamma releases database", "https://c.com/3"),
        ]);
        let titles: Vec<_> = out.iter().map(|a| a.title.clone()).collect();
        assert_eq!(
            titles,
            vec![
                "Alpha launches rockets",
                "Beta ships compilers",
                "Gamma releases database"
            ]
        );

        let again = dedup.deduplicate(out.clone());
        assert_eq!(again, out);
    }
}
