//! Component D: per-source scraper strategies and the shared BFS driver.
//!
//! The BFS loop generalizes `tools/crawl.rs::crawl_website` verbatim in
//! algorithm shape (visited set, queue of `(url, depth)`, per-wave
//! `buffer_unordered` batch, post-batch visited-set consolidation).

mod github;
mod local_file;
mod npm;
mod pypi;
mod web;

pub use github::GithubStrategy;
pub use local_file::LocalFileStrategy;
pub use npm::NpmStrategy;
pub use pypi::PypiStrategy;
pub use web::WebStrategy;

use crate::error::{IndexerError, Result};
use crate::types::{QueueItem, ScrapeOptions, ScrapedDocument, ScraperProgress};
use crate::url_utils::resolve_url;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cooperative cancellation token, checked at every suspension point. No
/// ambient thread-local — passed explicitly down every call (spec §9).
#[derive(Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.flag.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(std::sync::atomic::Ordering::SeqCst)
    }
}

pub type ProgressSink = Arc<dyn Fn(ScraperProgress) + Send + Sync>;

/// Outcome of processing one queue item: an optional document plus the
/// outbound links discovered on that page (pre-scope-filter).
pub struct ItemResult {
    pub document: Option<ScrapedDocument>,
    pub links: Vec<String>,
}

#[async_trait]
pub trait ScraperStrategy: Send + Sync {
    fn can_handle(&self, url: &str) -> bool;

    /// Strategy-specific per-item work: fetch + middleware chain (or, for
    /// local-file directories, directory listing).
    async fn process_item(&self, item: &QueueItem, options: &ScrapeOptions) -> Result<ItemResult>;

    /// Filters outbound links before they're admitted to the BFS queue
    /// (scope + ecosystem-specific predicates).
    fn filter_link(&self, seed: &str, candidate: &str, options: &ScrapeOptions) -> bool {
        let _ = (seed, candidate, options);
        true
    }

    /// Normalizes a URL for visited-set dedup. Ecosystem strategies override
    /// this with their registry-specific normalizer (spec §4.4); the default
    /// is the generic normalizer every strategy falls back to.
    fn normalize_for_dedup(&self, url: &str) -> String {
        crate::url_utils::normalize_url(url, Default::default())
    }

    /// Best-effort teardown of any per-crawl owned resource (e.g. the
    /// headless browser). Called once at the end of `scrape`.
    async fn shutdown(&self) {}
}

pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn ScraperStrategy>>,
}

impl StrategyRegistry {
    pub fn new(strategies: Vec<Arc<dyn ScraperStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn select(&self, url: &str) -> Result<Arc<dyn ScraperStrategy>> {
        self.strategies
            .iter()
            .find(|s| s.can_handle(url))
            .cloned()
            .ok_or_else(|| IndexerError::NoStrategy { url: url.to_string() })
    }
}

/// Shared breadth-first driver. Every per-source strategy delegates to this
/// once it knows how to `process_item` and `filter_link`.
///
/// Ordering guarantee: pure breadth-first — a URL reachable at depths
/// `d1 < d2` is always processed at `d1` (spec §4.4/§8).
pub async fn crawl(
    strategy: Arc<dyn ScraperStrategy>,
    seed_url: &str,
    options: ScrapeOptions,
    progress: ProgressSink,
    cancellation: CancellationHandle,
) -> Result<()> {
    let seed = strategy.normalize_for_dedup(seed_url);
    let visited: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let queue: Arc<Mutex<VecDeque<QueueItem>>> = Arc::new(Mutex::new(VecDeque::new()));

    {
        let mut v = visited.lock().await;
        v.insert(seed.clone());
    }
    {
        let mut q = queue.lock().await;
        q.push_back(QueueItem { url: seed.clone(), depth: 0 });
    }

    let mut pages_scraped = 0usize;
    let max_pages = options.max_pages;
    let max_depth = options.max_depth;
    let max_concurrency = options.max_concurrency.max(1);

    let result = loop {
        if cancellation.is_cancelled() {
            break Err(IndexerError::Cancellation { job_id: String::new() });
        }
        if pages_scraped >= max_pages {
            break Ok(());
        }

        let batch: Vec<QueueItem> = {
            let mut q = queue.lock().await;
            let remaining = max_pages.saturating_sub(pages_scraped);
            let batch_size = max_concurrency.min(remaining).min(q.len());
            if batch_size == 0 {
                break Ok(());
            }
            (0..batch_size).filter_map(|_| q.pop_front()).collect()
        };

        let strategy_ref = strategy.clone();
        let cancellation_ref = cancellation.clone();
        let options_ref = options.clone();

        let results: Vec<(QueueItem, Result<ItemResult>)> = stream::iter(batch.into_iter())
            .map(|item| {
                let strategy_ref = strategy_ref.clone();
                let cancellation_ref = cancellation_ref.clone();
                let options_ref = options_ref.clone();
                async move {
                    if item.depth > max_depth {
                        return (item, Ok(ItemResult { document: None, links: Vec::new() }));
                    }
                    if cancellation_ref.is_cancelled() {
                        return (
                            item,
                            Err(IndexerError::Cancellation { job_id: String::new() }),
                        );
                    }
                    let outcome = strategy_ref.process_item(&item, &options_ref).await;
                    (item, outcome)
                }
            })
            .buffer_unordered(max_concurrency)
            .collect()
            .await;

        let mut discovered: Vec<(String, u32)> = Vec::new();

        for (item, outcome) in results {
            match outcome {
                Ok(ItemResult { document, links }) => {
                    if let Some(doc) = document {
                        pages_scraped += 1;
                        progress(ScraperProgress {
                            pages_scraped,
                            max_pages,
                            current_url: item.url.clone(),
                            depth: item.depth,
                            max_depth,
                            document: Some(doc),
                        });
                    }
                    for link in links {
                        if let Some(resolved) = resolve_url(&seed, &link) {
                            discovered.push((resolved, item.depth + 1));
                        }
                    }
                }
                Err(IndexerError::Cancellation { .. }) => {
                    cancellation.trip();
                }
                Err(e) => {
                    if options.ignore_errors {
                        tracing::warn!("scrape item `{}` failed: {e}", item.url);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        // Consolidate newly discovered URLs through normalization before
        // enqueueing — avoids races on the visited set (spec §9).
        let mut v = visited.lock().await;
        let mut q = queue.lock().await;
        for (raw_url, depth) in discovered {
            let normalized = strategy.normalize_for_dedup(&raw_url);
            if v.contains(&normalized) {
                continue;
            }
            if !strategy.filter_link(&seed, &normalized, &options) {
                continue;
            }
            v.insert(normalized.clone());
            q.push_back(QueueItem { url: normalized, depth });
        }
        drop(v);
        drop(q);

        let q = queue.lock().await;
        if q.is_empty() {
            break Ok(());
        }
    };

    strategy.shutdown().await;
    result
}
