// tests/pipeline_e2e.rs
// Full curation pass: dedup, quality, history, scoring, ranking, and the
// archive round-trip that feeds the next run's history filter.

use chrono::{Duration, Utc};
use techpulse_curator::archive::ArchiveWriter;
use techpulse_curator::{
    Article, CurationConfig, CurationPipeline, HashedEmbeddings, HistoryStore, RelevanceScorer,
    TasteProfile,
};

fn article(title: &str, url: &str, words: usize, source: &str) -> Article {
    Article {
        title: title.into(),
        url: url.into(),
        published_at: Some(Utc::now() - Duration::hours(4)),
        body_text: format!("{} ", title).repeat(words / 3 + 1) + &"filler word ".repeat(words),
        source: source.into(),
        category: "general_tech".into(),
        author: Some("Reporter".into()),
        image_url: None,
        score: None,
    }
}

async fn build_pipeline(max_selected: usize) -> CurationPipeline<HashedEmbeddings> {
    let scorer =
        RelevanceScorer::new(TasteProfile::default_seed(), HashedEmbeddings::default()).await;
    CurationPipeline::new(
        CurationConfig {
            min_word_count: 100,
            max_selected,
            ..CurationConfig::default()
        },
        scorer,
    )
}

#[tokio::test]
async fn curate_selects_ranked_bounded_set() {
    let pipeline = build_pipeline(3).await;

    let input = vec![
        article(
            "New llm benchmark shows big transformer training gains",
            "https://a.example/llm",
            800,
            "TechCrunch",
        ),
        article(
            "Rust compiler lands major performance work",
            "https://b.example/rust",
            700,
            "Ars Technica",
        ),
        article(
            "Celebrity gossip roundup of the week",
            "https://c.example/gossip",
            500,
            "Tabloid Daily",
        ),
        article(
            "Startup closes seed funding round",
            "https://d.example/startup",
            400,
            "The Verge",
        ),
        article(
            "A quiet infrastructure note",
            "https://e.example/infra",
            300,
            "Unknown Blog",
        ),
    ];

    let out = pipeline.run(input, &Default::default()).await;

    assert_eq!(out.len(), 3);
    for pair in out.windows(2) {
        assert!(pair[0].score.unwrap() >= pair[1].score.unwrap());
    }
    for a in &out {
        let s = a.score.unwrap();
        assert!((0.0..=10.0).contains(&s));
    }
}

#[tokio::test]
async fn second_run_excludes_articles_archived_by_the_first() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = ArchiveWriter::new(tmp.path());
    let history = HistoryStore::new(writer.daily_dir(), 7);

    let pipeline = build_pipeline(10).await;
    let first_batch = vec![
        article(
            "Kernel scheduler rework explained",
            "https://a.example/kernel",
            600,
            "Ars Technica",
        ),
        article(
            "Inference costs drop again",
            "https://b.example/inference",
            600,
            "Wired",
        ),
    ];

    // Run 1: empty history, everything passes; archive the selection.
    let selected = pipeline.run(first_batch.clone(), &history.published_urls()).await;
    assert_eq!(selected.len(), 2);
    writer
        .write_daily(&selected, Utc::now().date_naive())
        .unwrap();

    // Run 2: same candidates plus one new article; only the new one survives.
    let mut second_batch = first_batch;
    second_batch.push(article(
        "Fresh database engine announced",
        "https://c.example/db",
        600,
        "TechCrunch",
    ));
    let second = pipeline.run(second_batch, &history.published_urls()).await;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].url, "https://c.example/db");
}

#[tokio::test]
async fn duplicates_and_spam_never_reach_scoring() {
    let pipeline = build_pipeline(10).await;

    let input = vec![
        article(
            "Apple Unveils New iPhone",
            "https://x.com/a?ref=1",
            600,
            "The Verge",
        ),
        // Same normalized URL.
        article(
            "Totally different headline",
            "https://x.com/a?ref=2",
            600,
            "The Verge",
        ),
        // Near-duplicate title at the 0.85 default threshold.
        article(
            "Apple Unveils the New iPhone",
            "https://y.com/b",
            600,
            "Wired",
        ),
        article(
            "CLICK HERE FOR FREE MONEY",
            "https://z.com/spam",
            600,
            "Spammy",
        ),
    ];

    let out = pipeline.run(input, &Default::default()).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "Apple Unveils New iPhone");
}
