// src/embedding.rs
//! Embedding provider abstraction: the remote capability the scorer depends
//! on, a caching wrapper keyed by exact text, and the vector math used by
//! topic matching.
//!
//! Provider errors never propagate past this module: a failed call degrades
//! to a zero vector so every downstream signal still receives a well-formed
//! input.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Maps text to a fixed-length vector. Identical text must yield usable
/// (not necessarily byte-identical) vectors for caching to be effective.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dimensions(&self) -> usize;
    fn name(&self) -> &'static str;
}

/// Remote provider using the OpenAI embeddings endpoint. Requires
/// `OPENAI_API_KEY`; every call carries its own bounded timeout.
pub struct OpenAiEmbeddings {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddings {
    /// `model_override`: pass Some("text-embedding-3-large") to override.
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("techpulse-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_EMBEDDING_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.api_key.is_empty() {
            return Err(anyhow!("OPENAI_API_KEY is not set"));
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            input: [&'a str; 1],
        }
        #[derive(Deserialize)]
        struct Resp {
            data: Vec<Row>,
        }
        #[derive(Deserialize)]
        struct Row {
            embedding: Vec<f32>,
        }

        let cleaned = text.replace('\n', " ");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(vec![0.0; self.dimensions()]);
        }

        let resp = self
            .http
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&Req {
                model: &self.model,
                input: [cleaned],
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("embeddings endpoint returned {}", resp.status()));
        }
        let body: Resp = resp.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|r| r.embedding)
            .ok_or_else(|| anyhow!("embeddings response carried no rows"))
    }

    fn dimensions(&self) -> usize {
        DEFAULT_EMBEDDING_DIMENSIONS
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic offline provider: hashed bag-of-words folded into a small
/// fixed-width vector, L2-normalized. Shared vocabulary between two texts
/// yields high cosine similarity, which is enough for tests and offline runs.
pub struct HashedEmbeddings {
    dims: usize,
}

impl HashedEmbeddings {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(8) }
    }
}

impl Default for HashedEmbeddings {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut v = vec![0.0f32; self.dims];
        for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dims as u64) as usize;
            // Sign bit keeps unrelated vocabularies from all pointing the same way.
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &'static str {
        "hashed"
    }
}

/// Caching wrapper owned by one scorer instance. The cache is keyed by the
/// exact text string and shared between topic-embedding generation and
/// article scoring; provider errors degrade to a logged zero vector.
pub struct CachedEmbeddings<P: EmbeddingProvider> {
    inner: P,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbeddings<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    /// Cache hit, or one provider call. Never fails: errors become a zero
    /// vector (uninformative but well-formed), and are not cached so a later
    /// call may recover.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        if let Some(hit) = self
            .cache
            .lock()
            .expect("embedding cache poisoned")
            .get(text)
        {
            return hit.clone();
        }

        match self.inner.embed(text).await {
            Ok(v) => {
                self.cache
                    .lock()
                    .expect("embedding cache poisoned")
                    .insert(text.to_string(), v.clone());
                v
            }
            Err(e) => {
                warn!(provider = self.inner.name(), error = %e, "embedding failed, degrading to zero vector");
                vec![0.0; self.inner.dimensions()]
            }
        }
    }

    #[cfg(test)]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().expect("embedding cache poisoned").len()
    }
}

/// Cosine similarity with a zero-norm guard (zero vectors score 0.0).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
