// src/profile.rs
//! # Taste profile
//!
//! Declarative configuration of what the reader wants to see: weighted topic
//! clusters (priority / secondary / avoid), per-source trust weights, and the
//! blend coefficients for the scoring signals.
//!
//! - Loads from TOML (`TASTE_PROFILE_PATH` overrides the default path).
//! - An unparseable profile is a fatal construction error, surfaced to the
//!   caller; the built-in `default_seed()` exists for demos and tests.
//! - Loaded once per pipeline run; never reloaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_PROFILE_PATH: &str = "config/taste_profile.toml";
pub const ENV_PROFILE_PATH: &str = "TASTE_PROFILE_PATH";

/// Category fallback used when an avoid-topic wins the relevance match.
pub const GENERAL_CATEGORY: &str = "General";

/// One weighted topic cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicCluster {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub weight: f32,
}

impl TopicCluster {
    /// Text submitted to the embedding provider for this topic.
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.name, self.keywords.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Priority,
    Secondary,
    Avoid,
}

/// Blend coefficients for the five scoring signals. Expected to sum to ≈1.0
/// but not enforced; the scorer simply computes the weighted sum.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_topic_relevance")]
    pub topic_relevance: f32,
    #[serde(default = "default_source_trust")]
    pub source_trust: f32,
    #[serde(default = "default_content_quality")]
    pub content_quality: f32,
    #[serde(default = "default_recency")]
    pub recency: f32,
    #[serde(default = "default_uniqueness")]
    pub uniqueness: f32,
}

fn default_topic_relevance() -> f32 {
    0.4
}
fn default_source_trust() -> f32 {
    0.15
}
fn default_content_quality() -> f32 {
    0.2
}
fn default_recency() -> f32 {
    0.15
}
fn default_uniqueness() -> f32 {
    0.1
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            topic_relevance: default_topic_relevance(),
            source_trust: default_source_trust(),
            content_quality: default_content_quality(),
            recency: default_recency(),
            uniqueness: default_uniqueness(),
        }
    }
}

/// Immutable per-run configuration. `source_weights` is a `BTreeMap` so the
/// "first substring match" rule is deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasteProfile {
    #[serde(default)]
    pub priority_topics: Vec<TopicCluster>,
    #[serde(default)]
    pub secondary_topics: Vec<TopicCluster>,
    #[serde(default)]
    pub avoid_topics: Vec<TopicCluster>,
    /// Source-name substring → trust weight, roughly 0.5–1.2.
    #[serde(default)]
    pub source_weights: BTreeMap<String, f32>,
    #[serde(default)]
    pub scoring: ScoringWeights,
}

impl TasteProfile {
    /// Parse from a TOML string. Errors are fatal: a broken profile must stop
    /// pipeline construction, not degrade silently.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let profile: TasteProfile =
            toml::from_str(toml_str).context("parsing taste profile TOML")?;
        Ok(profile)
    }

    /// Load from a file path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading taste profile at {}", path.display()))?;
        let profile = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            topics = profile.topic_count(),
            sources = profile.source_weights.len(),
            "loaded taste profile"
        );
        Ok(profile)
    }

    /// Resolve the profile path (`TASTE_PROFILE_PATH` or the default) and load.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_PROFILE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_PATH));
        Self::load_from_file(path)
    }

    pub fn topic_count(&self) -> usize {
        self.priority_topics.len() + self.secondary_topics.len() + self.avoid_topics.len()
    }

    /// All configured topics in a fixed order: priority, secondary, avoid.
    pub fn topics(&self) -> impl Iterator<Item = (&TopicCluster, TopicKind)> {
        self.priority_topics
            .iter()
            .map(|t| (t, TopicKind::Priority))
            .chain(
                self.secondary_topics
                    .iter()
                    .map(|t| (t, TopicKind::Secondary)),
            )
            .chain(self.avoid_topics.iter().map(|t| (t, TopicKind::Avoid)))
    }

    /// Source-trust signal in [0, 1]: first configured key (lexicographic
    /// order) that substring-matches the source name, rescaled from the
    /// [0.5, 1.2] weight domain. Unknown sources get 0.5.
    pub fn source_trust_for(&self, source: &str) -> f32 {
        let source_lower = source.to_lowercase();
        for (key, weight) in &self.source_weights {
            if source_lower.contains(&key.to_lowercase()) {
                return ((weight - 0.5) / 0.7).clamp(0.0, 1.0);
            }
        }
        0.5
    }

    /// Built-in profile used by the demo binary and tests when no config file
    /// is present.
    pub fn default_seed() -> Self {
        let mut source_weights = BTreeMap::new();
        for (k, v) in [
            ("ars technica", 1.0),
            ("hacker news", 0.9),
            ("mit technology review", 1.1),
            ("techcrunch", 1.0),
            ("the verge", 0.9),
            ("wired", 0.95),
        ] {
            source_weights.insert(k.to_string(), v);
        }

        Self {
            priority_topics: vec![
                TopicCluster {
                    name: "AI Research".into(),
                    keywords: ["llm", "transformer", "benchmark", "training", "inference"]
                        .map(String::from)
                        .to_vec(),
                    weight: 1.0,
                },
                TopicCluster {
                    name: "Systems Programming".into(),
                    keywords: ["rust", "compiler", "kernel", "performance", "concurrency"]
                        .map(String::from)
                        .to_vec(),
                    weight: 0.9,
                },
            ],
            secondary_topics: vec![TopicCluster {
                name: "Startups".into(),
                keywords: ["funding", "seed round", "founder", "venture"]
                    .map(String::from)
                    .to_vec(),
                weight: 0.6,
            }],
            avoid_topics: vec![TopicCluster {
                name: "Celebrity Gossip".into(),
                keywords: ["celebrity", "gossip", "scandal", "dating"]
                    .map(String::from)
                    .to_vec(),
                weight: 0.2,
            }],
            source_weights,
            scoring: ScoringWeights::default(),
        }
    }
}
