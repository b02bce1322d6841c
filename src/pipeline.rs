// src/pipeline.rs
//! Curation pipeline: dedup → quality → history → score → rank/truncate.
//!
//! Cheap local stages run before the compute-costly scoring step so nothing
//! that would be dropped anyway ever reaches the embedding provider. Each
//! stage consumes one immutable input and produces a new list; an empty
//! intermediate result short-circuits the rest of the run.

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::article::Article;
use crate::dedup::{Deduplicator, DEFAULT_TITLE_SIMILARITY_THRESHOLD};
use crate::embedding::EmbeddingProvider;
use crate::history::filter_by_history;
use crate::quality::{QualityFilter, DEFAULT_MIN_WORD_COUNT};
use crate::scorer::RelevanceScorer;

pub const DEFAULT_MAX_SELECTED: usize = 25;

/// One-time metrics registration (so series show up for exporters).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("curate_input_total", "Raw candidate articles entering a run.");
        describe_counter!("curate_dedup_removed_total", "Articles removed as duplicates.");
        describe_counter!(
            "curate_quality_removed_total",
            "Articles removed by the quality filter."
        );
        describe_counter!(
            "curate_history_removed_total",
            "Articles removed as recently published."
        );
        describe_counter!("curate_selected_total", "Articles selected for publication.");
        describe_gauge!("curate_last_run_ts", "Unix ts when curation last ran.");
    });
}

#[derive(Debug, Clone)]
pub struct CurationConfig {
    pub min_word_count: usize,
    pub title_similarity: f32,
    pub max_selected: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            min_word_count: DEFAULT_MIN_WORD_COUNT,
            title_similarity: DEFAULT_TITLE_SIMILARITY_THRESHOLD,
            max_selected: DEFAULT_MAX_SELECTED,
        }
    }
}

pub struct CurationPipeline<P: EmbeddingProvider> {
    dedup: Deduplicator,
    quality: QualityFilter,
    scorer: RelevanceScorer<P>,
    max_selected: usize,
}

impl<P: EmbeddingProvider> CurationPipeline<P> {
    pub fn new(config: CurationConfig, scorer: RelevanceScorer<P>) -> Self {
        Self {
            dedup: Deduplicator::new(config.title_similarity),
            quality: QualityFilter::new(config.min_word_count),
            scorer,
            max_selected: config.max_selected,
        }
    }

    /// One curation run. Always completes with a (possibly empty) ranked
    /// list bounded to `max_selected`; stage failures were already degraded
    /// further down, so nothing here errors.
    pub async fn run(
        &self,
        raw_articles: Vec<Article>,
        published_urls: &HashSet<String>,
    ) -> Vec<Article> {
        ensure_metrics_described();

        let input = raw_articles.len();
        counter!("curate_input_total").increment(input as u64);
        info!(input, "curation run started");

        let deduped = self.dedup.deduplicate(raw_articles);
        counter!("curate_dedup_removed_total").increment((input - deduped.len()) as u64);
        if deduped.is_empty() {
            return self.finish(Vec::new());
        }

        let before = deduped.len();
        let filtered = self.quality.filter(deduped);
        counter!("curate_quality_removed_total").increment((before - filtered.len()) as u64);
        if filtered.is_empty() {
            return self.finish(Vec::new());
        }

        let before = filtered.len();
        let fresh = filter_by_history(filtered, published_urls);
        counter!("curate_history_removed_total").increment((before - fresh.len()) as u64);
        if fresh.is_empty() {
            return self.finish(Vec::new());
        }

        // score_all already returns the batch sorted descending by score.
        let mut ranked = self.scorer.score_all(fresh).await;
        ranked.truncate(self.max_selected);
        self.finish(ranked)
    }

    fn finish(&self, selected: Vec<Article>) -> Vec<Article> {
        counter!("curate_selected_total").increment(selected.len() as u64);
        gauge!("curate_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        info!(selected = selected.len(), "curation run finished");
        selected
    }
}
