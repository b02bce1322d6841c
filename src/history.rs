// src/history.rs
//! Cross-run history: which URLs were already published in recent daily
//! archives, and the filter that keeps them out of the next edition.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::archive::load_daily;
use crate::article::Article;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Read-only view over the daily archive directory. Rebuilt fresh each run;
/// never persists anything itself.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    daily_dir: PathBuf,
    lookback_days: i64,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(daily_dir: P, lookback_days: i64) -> Self {
        Self {
            daily_dir: daily_dir.into(),
            lookback_days: lookback_days.max(0),
        }
    }

    /// Union of article URLs from every archive whose filename date falls
    /// within the lookback window. Missing directory or malformed files are
    /// warnings, never errors: the first run must not be blocked.
    pub fn published_urls(&self) -> HashSet<String> {
        let mut published = HashSet::new();

        let entries = match fs::read_dir(&self.daily_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.daily_dir.display(), error = %e, "daily archive dir not readable");
                return published;
            }
        };

        let cutoff = Utc::now().date_naive() - Duration::days(self.lookback_days);

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            let file_date = match NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping archive with unparseable date");
                    continue;
                }
            };
            if file_date < cutoff {
                continue;
            }

            match load_daily(&path) {
                Ok(doc) => {
                    debug!(file = %path.display(), articles = doc.articles.len(), "loaded archive");
                    published.extend(doc.articles.into_iter().map(|a| a.url));
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable archive");
                }
            }
        }

        info!(
            urls = published.len(),
            lookback_days = self.lookback_days,
            "collected previously published urls"
        );
        published
    }
}

/// Drop articles whose exact URL appears in `published`. An empty set is the
/// identity function.
pub fn filter_by_history(articles: Vec<Article>, published: &HashSet<String>) -> Vec<Article> {
    if articles.is_empty() || published.is_empty() {
        return articles;
    }

    let total = articles.len();
    let fresh: Vec<Article> = articles
        .into_iter()
        .filter(|a| {
            let seen = published.contains(&a.url);
            if seen {
                debug!(title = %a.title, "already published recently");
            }
            !seen
        })
        .collect();

    info!(
        removed = total - fresh.len(),
        kept = fresh.len(),
        "history-filtered articles"
    );
    fresh
}
