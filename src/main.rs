//! Illustrative wiring only (config + logging + one scrape job) — the CLI
//! surface and the agent-facing RPC server are out of scope (SPEC_FULL.md
//! §1 / §6); this binary just proves the core wires together end to end.
//! Gated behind the `dev-tools` feature so it is never shipped.

use doc_indexer::config::load_config;
use doc_indexer::job::{JobManager, ScraperServiceRunner};
use doc_indexer::scrape::{GithubStrategy, LocalFileStrategy, NpmStrategy, PypiStrategy, StrategyRegistry, WebStrategy};
use doc_indexer::store::{embedding_text, DocumentStore, EmbeddingClient, FixedDimensionEmbedder};
use doc_indexer::tools::{ScrapeOutcome, ScrapeRequest, ScrapeTool, SearchRequest, SearchTool, ToolContext};
use doc_indexer::types::ScrapeOptions;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Stand-in for the real embedding-model HTTP client (out of scope per
/// SPEC_FULL.md §1): deterministic hashed bag-of-words so the demo runs
/// without network access to a model provider.
struct HashEmbedder {
    dimension: usize,
}

#[async_trait]
impl EmbeddingClient for HashEmbedder {
    async fn embed(&self, text: &str) -> doc_indexer::error::Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let bucket = token.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize)) % self.dimension;
            v[bucket] += 1.0;
        }
        Ok(v)
    }
}

fn parse_args() -> (String, String, String) {
    let mut args = std::env::args().skip(1);
    let library = args.next().unwrap_or_else(|| "example".to_string());
    let url = args.next().unwrap_or_else(|| "file://./README.md".to_string());
    let query = args.next().unwrap_or_else(|| "getting started".to_string());
    (library, url, query)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = load_config();
    let storage_path = config.resolve_storage_path();
    info!("storage path: {}", storage_path.display());
    info!("embedding model: {}", config.resolve_embedding_model());

    let dimension = 32; // small dimension for the demo; production uses doc_indexer::config::EMBEDDING_DIMENSION
    let store = Arc::new(DocumentStore::open(&storage_path, dimension).await?);
    let embedder = Arc::new(FixedDimensionEmbedder::probe(Arc::new(HashEmbedder { dimension }), dimension, false).await?);

    let http_client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(30)).build()?;
    let chrome = config.resolve_chrome_executable();
    let registry = Arc::new(StrategyRegistry::new(vec![
        Arc::new(WebStrategy::new(http_client.clone(), chrome.clone())),
        Arc::new(LocalFileStrategy::new()),
        Arc::new(GithubStrategy::new(http_client.clone(), chrome.clone())),
        Arc::new(NpmStrategy::new(http_client.clone(), chrome.clone())),
        Arc::new(PypiStrategy::new(http_client, chrome)),
    ]));

    let runner = Arc::new(ScraperServiceRunner::new(registry, store.clone(), embedder.clone()));
    let jobs = Arc::new(JobManager::new(runner, config.resolve_worker_pool_size()));
    jobs.start().await;

    let ctx = ToolContext { store, jobs, embedder };

    let (library, url, query) = parse_args();
    let scrape = ScrapeTool::new(&ctx);
    let outcome = scrape
        .execute(ScrapeRequest {
            library: library.clone(),
            version: String::new(),
            url,
            options: ScrapeOptions {
                max_pages: 5,
                max_depth: 1,
                ..ScrapeOptions::default()
            },
            wait: true,
        })
        .await?;

    match outcome {
        ScrapeOutcome::PagesScraped(n) => info!("scraped {n} pages for `{library}`"),
        ScrapeOutcome::JobId(id) => info!("job {id} enqueued"),
    }

    let search = SearchTool::new(&ctx);
    let hits = search
        .execute(SearchRequest {
            library,
            version: None,
            query: query.clone(),
            limit: 5,
            exact_match: false,
        })
        .await?;

    info!("{} result(s) for `{query}`", hits.len());
    for hit in hits {
        println!("--- {} (score {:.4}) ---\n{}\n", hit.url, hit.score, hit.content);
    }

    // Proves the embedding-text prefix contract from SPEC_FULL.md §4.6 is
    // reachable from outside the store module.
    let _ = embedding_text("title", "url", &[], "content");

    Ok(())
}
