//! End-to-end pipeline test: local-file crawl -> split -> embed -> store ->
//! scrape+search tools, wired exactly as `main.rs` wires them but against an
//! in-memory store and a temp directory instead of the network.

use async_trait::async_trait;
use doc_indexer::error::Result;
use doc_indexer::job::{JobManager, ScraperServiceRunner};
use doc_indexer::scrape::{LocalFileStrategy, StrategyRegistry};
use doc_indexer::store::{DocumentStore, EmbeddingClient, FixedDimensionEmbedder};
use doc_indexer::tools::{
    FindVersionRequest, FindVersionTool, ListLibrariesTool, RemoveRequest, RemoveTool, ScrapeOutcome, ScrapeRequest,
    ScrapeTool, SearchRequest, SearchTool, ToolContext,
};
use doc_indexer::types::ScrapeOptions;
use std::sync::Arc;
use url::Url;

const DIMENSION: usize = 8;

/// Deterministic stand-in for the real embedding-model HTTP service
/// (out of scope per SPEC_FULL.md §1): buckets each token into a fixed-size
/// vector so related text ends up with non-zero cosine similarity.
struct HashEmbedder;

#[async_trait]
impl EmbeddingClient for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIMENSION];
        for token in text.to_lowercase().split_whitespace() {
            let bucket = token.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize)) % DIMENSION;
            v[bucket] += 1.0;
        }
        Ok(v)
    }
}

async fn build_ctx() -> (tempfile::TempDir, ToolContext) {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("index.md"),
        "# Getting Started\n\nInstall the package and call `init()` to bootstrap hooks.\n\n## Advanced\n\nUse hooks for stateful logic.\n",
    )
    .await
    .unwrap();

    let store = Arc::new(DocumentStore::open_in_memory(DIMENSION).await.unwrap());
    let embedder = Arc::new(FixedDimensionEmbedder::probe(Arc::new(HashEmbedder), DIMENSION, false).await.unwrap());
    let registry = Arc::new(StrategyRegistry::new(vec![Arc::new(LocalFileStrategy::new())]));
    let runner = Arc::new(ScraperServiceRunner::new(registry, store.clone(), embedder.clone()));
    let jobs = Arc::new(JobManager::new(runner, 2));
    jobs.start().await;

    (dir, ToolContext { store, jobs, embedder })
}

fn seed_url(dir: &tempfile::TempDir) -> String {
    Url::from_file_path(dir.path()).unwrap().to_string()
}

#[tokio::test]
async fn scrape_then_search_recalls_seeded_content() {
    let (dir, ctx) = build_ctx().await;

    let scrape = ScrapeTool::new(&ctx);
    let outcome = scrape
        .execute(ScrapeRequest {
            library: "widgets".to_string(),
            version: "1.2.0".to_string(),
            url: seed_url(&dir),
            options: ScrapeOptions { max_pages: 10, max_depth: 2, ..ScrapeOptions::default() },
            wait: true,
        })
        .await
        .unwrap();

    let pages = match outcome {
        ScrapeOutcome::PagesScraped(n) => n,
        ScrapeOutcome::JobId(_) => panic!("expected synchronous completion"),
    };
    assert!(pages >= 1, "expected at least the seeded markdown file to be indexed");

    let search = SearchTool::new(&ctx);
    let hits = search
        .execute(SearchRequest {
            library: "widgets".to_string(),
            version: None,
            query: "hooks".to_string(),
            limit: 5,
            exact_match: false,
        })
        .await
        .unwrap();

    assert!(!hits.is_empty(), "expected a recall for a token present in the seeded document");
    assert!(hits.iter().any(|h| h.content.to_lowercase().contains("hooks")));
}

#[tokio::test]
async fn find_version_reports_highest_stable_after_two_scrapes() {
    let (dir, ctx) = build_ctx().await;
    let scrape = ScrapeTool::new(&ctx);

    for version in ["1.0.0", "2.0.0"] {
        scrape
            .execute(ScrapeRequest {
                library: "widgets".to_string(),
                version: version.to_string(),
                url: seed_url(&dir),
                options: ScrapeOptions { max_pages: 10, max_depth: 2, ..ScrapeOptions::default() },
                wait: true,
            })
            .await
            .unwrap();
    }

    let find_version = FindVersionTool::new(&ctx);
    let outcome = find_version
        .execute(FindVersionRequest { library: "widgets".to_string(), target_version: None })
        .await
        .unwrap();
    assert_eq!(outcome.version, Some("2.0.0".to_string()));
    assert!(!outcome.has_unversioned_docs);
}

#[tokio::test]
async fn remove_then_list_shows_the_pair_gone() {
    let (dir, ctx) = build_ctx().await;
    let scrape = ScrapeTool::new(&ctx);
    scrape
        .execute(ScrapeRequest {
            library: "widgets".to_string(),
            version: "1.0.0".to_string(),
            url: seed_url(&dir),
            options: ScrapeOptions { max_pages: 10, max_depth: 2, ..ScrapeOptions::default() },
            wait: true,
        })
        .await
        .unwrap();

    let list = ListLibrariesTool::new(&ctx);
    assert!(list.execute().await.unwrap().iter().any(|(lib, _)| lib == "widgets"));

    let remove = RemoveTool::new(&ctx);
    remove.execute(RemoveRequest { library: "widgets".to_string(), version: Some("1.0.0".to_string()) }).await.unwrap();

    let libraries = list.execute().await.unwrap();
    assert!(!libraries.iter().any(|(lib, _)| lib == "widgets"));

    let search = SearchTool::new(&ctx);
    let err = search
        .execute(SearchRequest { library: "widgets".to_string(), version: None, query: "hooks".to_string(), limit: 5, exact_match: false })
        .await
        .unwrap_err();
    assert!(matches!(err, doc_indexer::error::IndexerError::LibraryNotFound { .. }));
}
