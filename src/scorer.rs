// src/scorer.rs
//! # Relevance scorer
//! Pure, testable blend of five signals per article: topic relevance
//! (embedding similarity against the taste profile), source trust, content
//! quality, recency, and uniqueness. Output is a 0–10 score with one decimal
//! plus the best-matching topic name.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::article::Article;
use crate::embedding::{cosine_similarity, CachedEmbeddings, EmbeddingProvider};
use crate::profile::{TasteProfile, TopicKind, GENERAL_CATEGORY};

/// Score assigned when scoring a single record fails inside a batch.
pub const DEFAULT_SCORE: f32 = 5.0;

/// Characters of normalized body text used as the embedding excerpt.
const EXCERPT_MAX_CHARS: usize = 300;

/// Swappable uniqueness signal. Currently a constant; kept behind a trait so
/// a real content-based implementation can be injected without touching the
/// blending logic.
pub trait UniquenessSignal: Send + Sync {
    fn uniqueness(&self, article: &Article) -> f32;
}

pub struct ConstantUniqueness(pub f32);

impl Default for ConstantUniqueness {
    fn default() -> Self {
        Self(0.7)
    }
}

impl UniquenessSignal for ConstantUniqueness {
    fn uniqueness(&self, _article: &Article) -> f32 {
        self.0
    }
}

/// One topic embedding held for the scorer's lifetime.
struct TopicVector {
    display_name: String,
    weight: f32,
    kind: TopicKind,
    embedding: Vec<f32>,
}

pub struct RelevanceScorer<P: EmbeddingProvider> {
    profile: TasteProfile,
    embeddings: CachedEmbeddings<P>,
    topics: Vec<TopicVector>,
    uniqueness: Box<dyn UniquenessSignal>,
}

impl<P: EmbeddingProvider> RelevanceScorer<P> {
    /// Build topic embeddings once; the same exact-text cache then serves
    /// article scoring for this instance's lifetime.
    pub async fn new(profile: TasteProfile, provider: P) -> Self {
        Self::with_uniqueness(profile, provider, Box::<ConstantUniqueness>::default()).await
    }

    pub async fn with_uniqueness(
        profile: TasteProfile,
        provider: P,
        uniqueness: Box<dyn UniquenessSignal>,
    ) -> Self {
        let embeddings = CachedEmbeddings::new(provider);

        let mut topics = Vec::with_capacity(profile.topic_count());
        for (topic, kind) in profile.topics() {
            let embedding = embeddings.embed(&topic.embedding_text()).await;
            let display_name = match kind {
                TopicKind::Avoid => format!("AVOID: {}", topic.name),
                _ => topic.name.clone(),
            };
            topics.push(TopicVector {
                display_name,
                weight: topic.weight,
                kind,
                embedding,
            });
        }

        info!(
            topics = topics.len(),
            provider = embeddings.provider_name(),
            "relevance scorer ready"
        );

        Self {
            profile,
            embeddings,
            topics,
            uniqueness,
        }
    }

    /// Score one article: (score in [0, 10] rounded to one decimal, category).
    pub async fn score(&self, article: &Article) -> Result<(f32, String)> {
        let text = build_article_text(article);
        let embedding = self.embeddings.embed(&text).await;

        let (topic_score, category) = self.topic_relevance(&embedding);
        let source_score = self.profile.source_trust_for(&article.source);
        let quality_score = content_quality(article);
        let recency_score = recency(article.published_at, Utc::now());
        let uniqueness_score = self.uniqueness.uniqueness(article);

        let w = &self.profile.scoring;
        let blended = topic_score * w.topic_relevance
            + source_score * w.source_trust
            + quality_score * w.content_quality
            + recency_score * w.recency
            + uniqueness_score * w.uniqueness;

        let final_score = ((blended * 10.0).clamp(0.0, 10.0) * 10.0).round() / 10.0;
        Ok((final_score, category))
    }

    /// Score a batch. One record failing degrades to `DEFAULT_SCORE` and the
    /// generic category instead of aborting the batch; the result is sorted
    /// descending by score (stable, so ties keep their input order).
    pub async fn score_all(&self, articles: Vec<Article>) -> Vec<Article> {
        let total = articles.len();
        let mut scored = Vec::with_capacity(total);

        for mut article in articles {
            match self.score(&article).await {
                Ok((score, category)) => {
                    article.score = Some(score);
                    article.category = category;
                }
                Err(e) => {
                    warn!(title = %article.title, error = %e, "scoring failed, assigning default");
                    article.score = Some(DEFAULT_SCORE);
                    article.category = GENERAL_CATEGORY.to_string();
                }
            }
            scored.push(article);
        }

        scored.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(top) = scored.first() {
            info!(
                total,
                top_score = top.score.unwrap_or(0.0),
                top_title = %top.title,
                "scored articles"
            );
        }
        scored
    }

    /// Maximum weight-adjusted cosine similarity against the configured
    /// topics, rescaled from [-1, 1] to [0, 1]. An avoid-topic may still win;
    /// only its display category is replaced by the generic fallback — the
    /// numeric score is left to the topic's own weight.
    fn topic_relevance(&self, article_embedding: &[f32]) -> (f32, String) {
        if self.topics.is_empty() {
            return (0.5, GENERAL_CATEGORY.to_string());
        }

        let mut best_sim = f32::NEG_INFINITY;
        let mut best: &TopicVector = &self.topics[0];
        for topic in &self.topics {
            let weighted = cosine_similarity(article_embedding, &topic.embedding) * topic.weight;
            if weighted > best_sim {
                best_sim = weighted;
                best = topic;
            }
        }

        let category = if best.kind == TopicKind::Avoid {
            GENERAL_CATEGORY.to_string()
        } else {
            best.display_name.clone()
        };

        let score = ((best_sim + 1.0) / 2.0).clamp(0.0, 1.0);
        (score, category)
    }
}

/// Pipe-joined labeled segments submitted to the embedding provider.
fn build_article_text(article: &Article) -> String {
    let mut parts = Vec::with_capacity(3);
    if !article.title.is_empty() {
        parts.push(format!("Title: {}", article.title));
    }
    let excerpt = article.excerpt(EXCERPT_MAX_CHARS);
    if !excerpt.is_empty() {
        parts.push(format!("Summary: {excerpt}"));
    }
    if !article.category.is_empty() {
        parts.push(format!("Category: {}", article.category));
    }
    parts.join(" | ")
}

/// Base 0.5 with bonuses for a substantial excerpt, a long body, an author,
/// and an image; clamped to 1.0.
fn content_quality(article: &Article) -> f32 {
    let mut score: f32 = 0.5;

    let excerpt_len = article.excerpt(EXCERPT_MAX_CHARS).chars().count();
    if excerpt_len > 200 {
        score += 0.2;
    } else if excerpt_len > 100 {
        score += 0.1;
    }

    let words = article.word_count();
    if words > 1000 {
        score += 0.2;
    } else if words > 500 {
        score += 0.1;
    }

    if article.author.is_some() {
        score += 0.05;
    }
    if article.image_url.is_some() {
        score += 0.05;
    }

    score.min(1.0)
}

/// Bucketed freshness: <6h → 1.0, <24h → 0.9, <48h → 0.7, <168h → 0.5,
/// older → 0.3; missing timestamp → 0.5.
fn recency(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f32 {
    let published = match published_at {
        Some(ts) => ts,
        None => return 0.5,
    };
    let age_hours = (now - published).num_seconds() as f32 / 3600.0;
    if age_hours < 6.0 {
        1.0
    } else if age_hours < 24.0 {
        0.9
    } else if age_hours < 48.0 {
        0.7
    } else if age_hours < 168.0 {
        0.5
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashedEmbeddings;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Duration;

    fn article(title: &str, body_words: usize, source: &str) -> Article {
        Article {
            title: title.into(),
            url: format!("https://example.com/{}", title.len()),
            published_at: Some(Utc::now() - Duration::hours(3)),
            body_text: "word ".repeat(body_words).trim().to_string(),
            source: source.into(),
            category: "general_tech".into(),
            author: None,
            image_url: None,
            score: None,
        }
    }

    #[test]
    fn recency_buckets() {
        let now = Utc::now();
        let at = |h: i64| Some(now - Duration::hours(h));
        assert_eq!(recency(at(1), now), 1.0);
        assert_eq!(recency(at(12), now), 0.9);
        assert_eq!(recency(at(30), now), 0.7);
        assert_eq!(recency(at(100), now), 0.5);
        assert_eq!(recency(at(200), now), 0.3);
        assert_eq!(recency(None, now), 0.5);
    }

    #[test]
    fn content_quality_bonuses_clamp_at_one() {
        let mut a = article("T", 1200, "X");
        a.author = Some("Jane Doe".into());
        a.image_url = Some("https://img.example/x.png".into());
        // excerpt > 200 chars (+0.2), words > 1000 (+0.2), author (+0.05), image (+0.05)
        assert!((content_quality(&a) - 1.0).abs() < 1e-6);

        let short = article("T", 10, "X");
        assert!((content_quality(&short) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn article_text_is_pipe_joined_and_skips_empty_segments() {
        let mut a = article("Rust 1.80 released", 20, "X");
        a.category = String::new();
        let text = build_article_text(&a);
        assert!(text.starts_with("Title: Rust 1.80 released | Summary:"));
        assert!(!text.contains("Category:"));
    }

    #[tokio::test]
    async fn score_is_bounded_and_categorized() {
        let scorer =
            RelevanceScorer::new(TasteProfile::default_seed(), HashedEmbeddings::default()).await;
        let a = article(
            "New llm benchmark shows transformer training gains",
            1200,
            "TechCrunch",
        );
        let (score, category) = scorer.score(&a).await.unwrap();
        assert!((0.0..=10.0).contains(&score));
        assert!(!category.is_empty());
        // One decimal place.
        assert!((score * 10.0 - (score * 10.0).round()).abs() < 1e-4);
    }

    #[tokio::test]
    async fn avoid_topic_winner_falls_back_to_general_category() {
        let mut profile = TasteProfile::default_seed();
        // Make the avoid topic dominant so it wins the similarity race.
        profile.priority_topics.clear();
        profile.secondary_topics.clear();
        profile.avoid_topics[0].weight = 1.0;
        let scorer = RelevanceScorer::new(profile, HashedEmbeddings::default()).await;

        let a = article("Celebrity gossip scandal dating rumors", 600, "X");
        let (score, category) = scorer.score(&a).await.unwrap();
        assert_eq!(category, GENERAL_CATEGORY);
        // Weight-only suppression: the score is not zeroed.
        assert!(score > 0.0);
    }

    #[tokio::test]
    async fn empty_profile_scores_neutral_topic_relevance() {
        let scorer =
            RelevanceScorer::new(TasteProfile::default(), HashedEmbeddings::default()).await;
        let (_, category) = scorer.score(&article("Anything", 600, "X")).await.unwrap();
        assert_eq!(category, GENERAL_CATEGORY);
    }

    /// Provider that always errors: the batch must still complete with zero
    /// vectors feeding topic relevance.
    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(anyhow!("provider down"))
        }
        fn dimensions(&self) -> usize {
            8
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn broken_provider_still_yields_full_batch_sorted_desc() {
        let scorer = RelevanceScorer::new(TasteProfile::default_seed(), BrokenProvider).await;
        let batch = vec![
            article("First story", 1200, "TechCrunch"),
            article("Second story", 250, "Unknown"),
        ];
        let out = scorer.score_all(batch).await;
        assert_eq!(out.len(), 2);
        for a in &out {
            let s = a.score.unwrap();
            assert!((0.0..=10.0).contains(&s));
        }
        assert!(out[0].score.unwrap() >= out[1].score.unwrap());
    }
}
