use super::{ItemResult, ScraperStrategy, WebStrategy};
use crate::error::Result;
use crate::types::{QueueItem, ScrapeOptions};
use crate::url_utils::NormalizeOptions;
use async_trait::async_trait;

/// Wraps the web strategy with an npm-registry-specific URL normalizer
/// (case-insensitive, hash-stripped, trailing-slash-stripped,
/// query-stripped) — spec §4.4.
pub struct NpmStrategy {
    inner: WebStrategy,
}

impl NpmStrategy {
    pub fn new(http_client: reqwest::Client, chrome_executable: Option<String>) -> Self {
        Self {
            inner: WebStrategy::new(http_client, chrome_executable),
        }
    }
}

#[async_trait]
impl ScraperStrategy for NpmStrategy {
    fn can_handle(&self, url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case("www.npmjs.com") || h.eq_ignore_ascii_case("npmjs.com")))
            .unwrap_or(false)
    }

    async fn process_item(&self, item: &QueueItem, options: &ScrapeOptions) -> Result<ItemResult> {
        self.inner.process_item(item, options).await
    }

    fn filter_link(&self, seed: &str, candidate: &str, options: &ScrapeOptions) -> bool {
        self.inner.filter_link(seed, candidate, options)
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
    }

    /// npm package/version URLs are case-insensitive for dedup purposes;
    /// lowercase the path and drop the query string (spec §4.4).
    fn normalize_for_dedup(&self, url: &str) -> String {
        crate::url_utils::normalize_url(
            url,
            NormalizeOptions {
                lowercase_path: true,
                strip_query: true,
                strip_index_files: false,
            },
        )
    }
}
