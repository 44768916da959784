//! Component B: polymorphic byte fetch for `http(s)://` and `file://`.

mod file;
mod http;

pub use file::FileFetcher;
pub use http::HttpFetcher;

use crate::error::Result;
use crate::types::RawContent;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<std::time::Duration>,
    pub follow_redirects: bool,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    fn can_fetch(&self, source: &str) -> bool;
    async fn fetch(&self, source: &str, opts: &FetchOptions) -> Result<RawContent>;
}

/// First-match-wins fetcher registry (spec §9: "sequence of (predicate,
/// strategy) pairs").
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl FetcherRegistry {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            fetchers: vec![
                Box::new(HttpFetcher::new(http_client)),
                Box::new(FileFetcher),
            ],
        }
    }

    pub fn select(&self, source: &str) -> Option<&dyn Fetcher> {
        self.fetchers.iter().find(|f| f.can_fetch(source)).map(|b| b.as_ref())
    }
}
