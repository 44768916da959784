//! The `ScraperService` shim (spec §4.8): resolves a seed URL to a strategy,
//! runs the crawl, splits each scraped document, embeds its chunks, and
//! streams them into the store — the concrete `JobRunner` every `JobManager`
//! in this crate is built with.
//!
//! `ProgressSink` is a synchronous callback (grounded in `scrape::crawl`'s
//! signature), but splitting/embedding/storing a document is all async, so
//! each reported document is forwarded over an unbounded channel to a
//! consumer task awaited after the crawl finishes — this keeps `run()` from
//! returning (and the job from going `Completed`) before every page it
//! reported is actually durable.

use crate::error::Result;
use crate::scrape::{crawl, CancellationHandle, ProgressSink, StrategyRegistry};
use crate::split::{split_document, SplitConfig};
use crate::store::{embedding_text, DocumentStore, FixedDimensionEmbedder};
use crate::types::{ScrapeOptions, ScraperProgress};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct ScraperServiceRunner {
    registry: Arc<StrategyRegistry>,
    store: Arc<DocumentStore>,
    embedder: Arc<FixedDimensionEmbedder>,
    split_config: SplitConfig,
}

impl ScraperServiceRunner {
    pub fn new(registry: Arc<StrategyRegistry>, store: Arc<DocumentStore>, embedder: Arc<FixedDimensionEmbedder>) -> Self {
        Self {
            registry,
            store,
            embedder,
            split_config: SplitConfig::default(),
        }
    }
}

#[async_trait]
impl super::JobRunner for ScraperServiceRunner {
    async fn run(
        &self,
        library: &str,
        version: &str,
        url: &str,
        options: &ScrapeOptions,
        progress: ProgressSink,
        cancellation: CancellationHandle,
    ) -> Result<usize> {
        let strategy = self.registry.select(url)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<ScraperProgress>();

        let store = self.store.clone();
        let embedder = self.embedder.clone();
        let split_config = self.split_config;
        let library = library.to_string();
        let version = version.to_string();

        let consumer = tokio::spawn(async move {
            let mut pages_stored = 0usize;
            while let Some(p) = rx.recv().await {
                let Some(doc) = p.document.clone() else {
                    progress(p);
                    continue;
                };
                let chunks = split_document(&doc.markdown, split_config);
                let mut embeddings = Vec::with_capacity(chunks.len());
                let mut embed_failed = false;
                for chunk in &chunks {
                    let text = embedding_text(&doc.title, &doc.url, &chunk.path, &chunk.content);
                    match embedder.embed(&text).await {
                        Ok(v) => embeddings.push(v),
                        Err(e) => {
                            tracing::warn!("embedding failed for `{}`: {e}", doc.url);
                            embed_failed = true;
                            break;
                        }
                    }
                }
                if embed_failed {
                    continue;
                }
                match store.insert_page(&library, &version, &doc.url, &doc.title, chunks, embeddings).await {
                    Ok(()) => pages_stored += 1,
                    Err(e) => tracing::warn!("store write failed for `{}`: {e}", doc.url),
                }
                progress(p);
            }
            pages_stored
        });

        let sink: ProgressSink = Arc::new(move |p: ScraperProgress| {
            let _ = tx.send(p);
        });

        let outcome = crawl(strategy, url, options.clone(), sink, cancellation).await;
        let pages_stored = consumer.await.unwrap_or(0);
        outcome?;
        Ok(pages_stored)
    }
}
