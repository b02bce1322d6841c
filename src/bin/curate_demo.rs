//! Demo that runs one offline curation pass: candidates from a JSON file,
//! taste profile from config (or the built-in seed), deterministic local
//! embeddings, archives written under `content/`.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use techpulse_curator::archive::ArchiveWriter;
use techpulse_curator::{
    Article, CurationConfig, CurationPipeline, HashedEmbeddings, HistoryStore, RelevanceScorer,
    TasteProfile,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();
    dotenvy::dotenv().ok();

    let candidates_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "candidates.json".to_string());
    let raw = std::fs::read_to_string(&candidates_path)
        .with_context(|| format!("reading candidates from {candidates_path}"))?;
    let candidates: Vec<Article> =
        serde_json::from_str(&raw).context("parsing candidate articles")?;
    info!(count = candidates.len(), file = %candidates_path, "loaded candidates");

    let profile = match TasteProfile::load_default() {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "taste profile not loadable, using built-in seed");
            TasteProfile::default_seed()
        }
    };

    let writer = ArchiveWriter::new("content");
    let history = HistoryStore::new(writer.daily_dir(), 7);
    let published = history.published_urls();

    let scorer = RelevanceScorer::new(profile, HashedEmbeddings::default()).await;
    let pipeline = CurationPipeline::new(CurationConfig::default(), scorer);
    let selected = pipeline.run(candidates, &published).await;

    writer.write_daily(&selected, Utc::now().date_naive())?;
    writer.write_latest(&selected)?;

    println!("curate-demo done: {} articles selected", selected.len());
    Ok(())
}
