use super::{ItemResult, ScraperStrategy};
use crate::error::Result;
use crate::fetch::{FetchOptions, FileFetcher, Fetcher};
use crate::middleware;
use crate::types::{ProcessingContext, QueueItem, ScrapeOptions, ScrapedDocument};
use async_trait::async_trait;
use url::Url;

/// Uses the file fetcher. For directory paths, returns every directory
/// entry as a `file://` link (recursed through BFS, same as any other
/// link). For files, runs the HTML or Markdown pipeline depending on MIME.
/// Never extracts links from file *content* (spec §4.4).
pub struct LocalFileStrategy {
    fetcher: FileFetcher,
}

impl LocalFileStrategy {
    pub fn new() -> Self {
        Self { fetcher: FileFetcher }
    }
}

impl Default for LocalFileStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScraperStrategy for LocalFileStrategy {
    fn can_handle(&self, url: &str) -> bool {
        url.starts_with("file://")
    }

    async fn process_item(&self, item: &QueueItem, options: &ScrapeOptions) -> Result<ItemResult> {
        let url = Url::parse(&item.url)?;
        let path = url
            .to_file_path()
            .map_err(|_| crate::error::IndexerError::InvalidUrl {
                url: item.url.clone(),
                reason: "not a valid file path".to_string(),
            })?;

        if path.is_dir() {
            let mut links = Vec::new();
            let mut entries = tokio::fs::read_dir(&path).await.map_err(|e| crate::error::IndexerError::Fetch {
                url: item.url.clone(),
                status: None,
                message: e.to_string(),
                retryable: false,
            })?;
            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Ok(child_url) = Url::from_file_path(entry.path()) {
                    links.push(child_url.to_string());
                }
            }
            return Ok(ItemResult { document: None, links });
        }

        let raw = self.fetcher.fetch(&item.url, &FetchOptions::default()).await?;
        if raw.mime_type != "text/html" && raw.mime_type != "text/markdown" && raw.mime_type != "text/plain" {
            return Ok(ItemResult { document: None, links: Vec::new() });
        }

        let mut ctx = ProcessingContext::new(raw, options.clone());
        let content_type = ctx.content_type.clone();
        // No link-extract stage for local-file content — never extracts
        // links from file content, only from directory listings.
        let chain = middleware::build_chain_for_content_type(&content_type, false, None);
        middleware::run_chain(&chain, &mut ctx).await;

        let title = ctx.metadata.get("title").cloned().unwrap_or_else(|| "Untitled".to_string());
        let markdown = ctx.markdown.unwrap_or_default();
        Ok(ItemResult {
            document: Some(ScrapedDocument {
                url: ctx.source,
                title,
                markdown,
                links: Vec::new(),
            }),
            links: Vec::new(),
        })
    }
}
