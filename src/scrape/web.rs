use super::{ItemResult, ScraperStrategy};
use crate::error::Result;
use crate::fetch::{FetchOptions, Fetcher, HttpFetcher};
use crate::middleware::{self, DynamicRenderMiddleware};
use crate::types::{ProcessingContext, QueueItem, RawContent, ScrapeOptions, ScrapedDocument};
use crate::url_utils::in_scope;
use async_trait::async_trait;
use std::sync::Arc;

/// Uses the HTTP fetcher, runs the full HTML/Markdown pipeline, and filters
/// outbound links by `options.scope` then an optional caller-supplied link
/// predicate. Owns a single headless-browser instance for the crawl,
/// guaranteed torn down via `shutdown`.
pub struct WebStrategy {
    fetcher: HttpFetcher,
    render: Arc<DynamicRenderMiddleware>,
    link_predicate: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl WebStrategy {
    pub fn new(http_client: reqwest::Client, chrome_executable: Option<String>) -> Self {
        Self {
            fetcher: HttpFetcher::new(http_client),
            render: Arc::new(DynamicRenderMiddleware::new(chrome_executable)),
            link_predicate: None,
        }
    }

    pub fn with_link_predicate(mut self, predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>) -> Self {
        self.link_predicate = Some(predicate);
        self
    }

    async fn run_pipeline(&self, raw: RawContent, options: &ScrapeOptions) -> Result<ScrapedDocument> {
        let mut ctx = ProcessingContext::new(raw, options.clone());
        let chain = middleware::build_chain_for_content_type(
            &ctx.content_type.clone(),
            true,
            Some(Box::new(ClonedRender(self.render.clone()))),
        );
        middleware::run_chain(&chain, &mut ctx).await;

        let title = ctx.metadata.get("title").cloned().unwrap_or_else(|| "Untitled".to_string());
        let markdown = ctx.markdown.unwrap_or_default();
        Ok(ScrapedDocument {
            url: ctx.source,
            title,
            markdown,
            links: ctx.links.into_iter().collect(),
        })
    }
}

/// Adapter so the shared `Arc<DynamicRenderMiddleware>` can be installed
/// into a per-page chain without cloning the browser handle itself.
struct ClonedRender(Arc<DynamicRenderMiddleware>);

#[async_trait]
impl middleware::Middleware for ClonedRender {
    async fn run(&self, ctx: &mut crate::types::ProcessingContext) -> middleware::MiddlewareOutcome {
        self.0.run(ctx).await
    }
}

#[async_trait]
impl ScraperStrategy for WebStrategy {
    fn can_handle(&self, url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    async fn process_item(&self, item: &QueueItem, options: &ScrapeOptions) -> Result<ItemResult> {
        let raw = self
            .fetcher
            .fetch(
                &item.url,
                &FetchOptions {
                    follow_redirects: options.follow_redirects,
                    ..Default::default()
                },
            )
            .await?;

        if raw.mime_type != "text/html" && raw.mime_type != "text/markdown" && raw.mime_type != "text/plain" {
            return Ok(ItemResult { document: None, links: Vec::new() });
        }

        let doc = self.run_pipeline(raw, options).await?;
        let links = doc.links.clone();
        Ok(ItemResult {
            document: Some(doc),
            links,
        })
    }

    fn filter_link(&self, seed: &str, candidate: &str, options: &ScrapeOptions) -> bool {
        if !in_scope(options.scope, seed, candidate) {
            return false;
        }
        if options
            .exclude_patterns
            .iter()
            .any(|p| crate::url_utils::matches_pattern(candidate, p))
        {
            return false;
        }
        if !options.include_patterns.is_empty()
            && !options
                .include_patterns
                .iter()
                .any(|p| crate::url_utils::matches_pattern(candidate, p))
        {
            return false;
        }
        match &self.link_predicate {
            Some(pred) => pred(candidate),
            None => true,
        }
    }

    async fn shutdown(&self) {
        self.render.shutdown().await;
    }
}
