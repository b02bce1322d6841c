// src/archive.rs
//! Archive documents consumed by the website and re-read by the history
//! filter: `latest.json` plus one `daily/YYYY-MM-DD.json` per run.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::article::Article;

/// One archived article. Only `url` is required on the read side; the history
/// filter tolerates archives written by older versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveArticle {
    pub url: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub read_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub total_articles: usize,
    pub avg_score: f32,
    pub sources: Vec<String>,
    pub categories: Vec<String>,
}

/// Daily archive document (`daily/YYYY-MM-DD.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyArchive {
    pub date: String,
    #[serde(default)]
    pub date_display: String,
    #[serde(default)]
    pub articles: Vec<ArchiveArticle>,
    #[serde(default)]
    pub stats: ArchiveStats,
}

/// Homepage snapshot (`latest.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestDoc {
    pub generated_at: DateTime<Utc>,
    pub date_display: String,
    pub articles: Vec<ArchiveArticle>,
    pub stats: ArchiveStats,
}

/// Writes content files under `output_dir` (`latest.json`, `daily/`).
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    output_dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn daily_dir(&self) -> PathBuf {
        self.output_dir.join("daily")
    }

    /// Write `daily/YYYY-MM-DD.json` for `date` from ranked articles.
    pub fn write_daily(&self, articles: &[Article], date: NaiveDate) -> Result<DailyArchive> {
        let doc = build_daily(articles, date);
        let dir = self.daily_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating archive dir {}", dir.display()))?;
        let path = dir.join(format!("{}.json", doc.date));
        write_json_atomic(&path, &doc)?;
        info!(path = %path.display(), articles = doc.articles.len(), "wrote daily archive");
        Ok(doc)
    }

    /// Write `latest.json` from ranked articles.
    pub fn write_latest(&self, articles: &[Article]) -> Result<LatestDoc> {
        let doc = LatestDoc {
            generated_at: Utc::now(),
            date_display: Utc::now().format("%B %-d, %Y").to_string(),
            articles: articles.iter().map(format_archive_article).collect(),
            stats: build_stats(articles),
        };
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output dir {}", self.output_dir.display()))?;
        let path = self.output_dir.join("latest.json");
        write_json_atomic(&path, &doc)?;
        info!(path = %path.display(), articles = doc.articles.len(), "wrote latest snapshot");
        Ok(doc)
    }
}

pub fn load_daily(path: &Path) -> Result<DailyArchive> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading archive {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing archive {}", path.display()))
}

fn build_daily(articles: &[Article], date: NaiveDate) -> DailyArchive {
    DailyArchive {
        date: date.format("%Y-%m-%d").to_string(),
        date_display: date.format("%B %-d, %Y").to_string(),
        articles: articles.iter().map(format_archive_article).collect(),
        stats: build_stats(articles),
    }
}

fn build_stats(articles: &[Article]) -> ArchiveStats {
    let scores: Vec<f32> = articles.iter().filter_map(|a| a.score).collect();
    let avg = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f32>() / scores.len() as f32
    };
    let sources: BTreeSet<String> = articles.iter().map(|a| a.source.clone()).collect();
    let categories: BTreeSet<String> = articles.iter().map(|a| a.category.clone()).collect();
    ArchiveStats {
        total_articles: articles.len(),
        avg_score: avg,
        sources: sources.into_iter().collect(),
        categories: categories.into_iter().collect(),
    }
}

fn format_archive_article(a: &Article) -> ArchiveArticle {
    ArchiveArticle {
        url: a.url.clone(),
        id: article_id(a),
        title: a.title.clone(),
        source: a.source.clone(),
        category: a.category.clone(),
        published: a.published_at,
        score: a.score,
        word_count: a.word_count(),
        read_time: read_time(a.word_count()),
    }
}

/// `YYYY-MM-DD-NNNN` where NNNN is a stable hash of the title.
fn article_id(a: &Article) -> String {
    let date = a
        .published_at
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%d")
        .to_string();
    let mut hasher = DefaultHasher::new();
    a.title.hash(&mut hasher);
    format!("{}-{:04}", date, hasher.finish() % 10_000)
}

/// Estimated reading time at 200 words per minute, minimum one minute.
pub fn read_time(word_count: usize) -> String {
    let minutes = ((word_count as f32 / 200.0).round() as usize).max(1);
    format!("{minutes} min")
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serializing archive document")?;
    let mut f = fs::File::create(&tmp)
        .with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scored(title: &str, url: &str, score: f32) -> Article {
        Article {
            title: title.into(),
            url: url.into(),
            published_at: Some(Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()),
            body_text: "word ".repeat(300).trim().to_string(),
            source: "TechCrunch".into(),
            category: "ai_news".into(),
            author: None,
            image_url: None,
            score: Some(score),
        }
    }

    #[test]
    fn daily_roundtrip_preserves_urls_and_stats() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(tmp.path());
        let articles = vec![
            scored("A big launch", "https://a.com/1", 9.0),
            scored("A quiet release", "https://b.com/2", 7.0),
        ];
        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        writer.write_daily(&articles, date).unwrap();

        let loaded = load_daily(&writer.daily_dir().join("2026-08-29.json")).unwrap();
        assert_eq!(loaded.date, "2026-08-29");
        assert_eq!(loaded.articles.len(), 2);
        assert_eq!(loaded.articles[0].url, "https://a.com/1");
        assert_eq!(loaded.stats.total_articles, 2);
        assert!((loaded.stats.avg_score - 8.0).abs() < 1e-3);
    }

    #[test]
    fn read_side_tolerates_minimal_entries() {
        let doc: DailyArchive = serde_json::from_str(
            r#"{"date":"2026-08-29","articles":[{"url":"https://a.com/x"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.articles[0].url, "https://a.com/x");
    }

    #[test]
    fn read_time_floors_at_one_minute() {
        assert_eq!(read_time(50), "1 min");
        assert_eq!(read_time(1000), "5 min");
    }
}
