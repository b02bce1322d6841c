// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod archive;
pub mod article;
pub mod dedup;
pub mod embedding;
pub mod history;
pub mod pipeline;
pub mod profile;
pub mod quality;
pub mod scorer;
pub mod similarity;

// ---- Re-exports for stable public API ----
pub use crate::article::Article;
pub use crate::embedding::{
    CachedEmbeddings, EmbeddingProvider, HashedEmbeddings, OpenAiEmbeddings,
};
pub use crate::history::{filter_by_history, HistoryStore};
pub use crate::pipeline::{CurationConfig, CurationPipeline};
pub use crate::profile::TasteProfile;
pub use crate::scorer::RelevanceScorer;
