//! Scrape tool (spec §4.9): validates + coerces version, clears existing
//! docs for `(library, version)`, enqueues a job, then either waits for
//! completion or returns the job id immediately.

use super::ToolContext;
use crate::error::{IndexerError, Result};
use crate::types::ScrapeOptions;
use crate::version::coerce_for_ingest;
use uuid::Uuid;

pub struct ScrapeRequest {
    pub library: String,
    /// Raw, caller-supplied version string. Empty means unversioned.
    pub version: String,
    pub url: String,
    pub options: ScrapeOptions,
    /// `true` waits for the job to finish and returns `PagesScraped`;
    /// `false` returns `JobId` immediately (spec §4.9).
    pub wait: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    PagesScraped(usize),
    JobId(Uuid),
}

pub struct ScrapeTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> ScrapeTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, request: ScrapeRequest) -> Result<ScrapeOutcome> {
        let version = coerce_for_ingest(&request.version).ok_or_else(|| IndexerError::VersionNotFound {
            library: request.library.clone(),
            requested: request.version.clone(),
            available: Vec::new(),
        })?;

        self.ctx.store.remove(&request.library, Some(&version)).await?;

        let job_id = self.ctx.jobs.enqueue_job(&request.library, &version, &request.url, request.options).await;

        if !request.wait {
            return Ok(ScrapeOutcome::JobId(job_id));
        }
        let pages_scraped = self.ctx.jobs.wait_for_job_completion(job_id).await?;
        Ok(ScrapeOutcome::PagesScraped(pages_scraped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobManager, ScraperServiceRunner};
    use crate::scrape::StrategyRegistry;
    use crate::store::{DocumentStore, EmbeddingClient, FixedDimensionEmbedder};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullEmbedder;

    #[async_trait]
    impl EmbeddingClient for NullEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
    }

    #[tokio::test]
    async fn rejects_unparseable_version() {
        let store = Arc::new(DocumentStore::open_in_memory(4).await.unwrap());
        let embedder = Arc::new(FixedDimensionEmbedder::probe(Arc::new(NullEmbedder), 4, false).await.unwrap());
        let registry = Arc::new(StrategyRegistry::new(Vec::new()));
        let runner = Arc::new(ScraperServiceRunner::new(registry, store.clone(), embedder.clone()));
        let jobs = Arc::new(JobManager::new(runner, 1));
        jobs.start().await;

        let ctx = ToolContext { store, jobs, embedder };
        let tool = ScrapeTool::new(&ctx);
        let err = tool
            .execute(ScrapeRequest {
                library: "react".to_string(),
                version: "latest".to_string(),
                url: "https://react.dev".to_string(),
                options: ScrapeOptions::default(),
                wait: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IndexerError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn clears_existing_docs_before_enqueueing() {
        let store = Arc::new(DocumentStore::open_in_memory(4).await.unwrap());
        store
            .insert_page(
                "react",
                "18.0.0",
                "https://react.dev/old",
                "Old",
                vec![crate::types::ContentChunk {
                    types: [crate::types::ChunkType::Text].into_iter().collect(),
                    content: "stale".to_string(),
                    level: 1,
                    path: vec![],
                }],
                vec![vec![0.0; 4]],
            )
            .await
            .unwrap();

        let embedder = Arc::new(FixedDimensionEmbedder::probe(Arc::new(NullEmbedder), 4, false).await.unwrap());
        let registry = Arc::new(StrategyRegistry::new(Vec::new()));
        let runner = Arc::new(ScraperServiceRunner::new(registry, store.clone(), embedder.clone()));
        let jobs = Arc::new(JobManager::new(runner, 1));
        jobs.stop(); // never schedule — we only care that `remove` ran first

        let ctx = ToolContext { store: store.clone(), jobs, embedder };
        let tool = ScrapeTool::new(&ctx);
        tool.execute(ScrapeRequest {
            library: "react".to_string(),
            version: "18.0.0".to_string(),
            url: "https://react.dev".to_string(),
            options: ScrapeOptions::default(),
            wait: false,
        })
        .await
        .unwrap();

        let versions = store.query_unique_versions("react").await.unwrap();
        assert!(versions.is_empty());
    }
}
