use super::{ItemResult, ScraperStrategy, WebStrategy};
use crate::error::Result;
use crate::types::{QueueItem, ScrapeOptions};
use crate::url_utils::NormalizeOptions;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Wraps the web strategy with a GitHub-specific URL normalizer
/// (case-insensitive, hash-stripped, trailing-slash-stripped,
/// query-stripped) and a link predicate confining traversal to
/// `/<owner>/<repo>`, `/<owner>/<repo>/wiki/...`, and `*.md` files under
/// `/<owner>/<repo>/blob/` (spec §4.4).
pub struct GithubStrategy {
    inner: WebStrategy,
}

impl GithubStrategy {
    pub fn new(http_client: reqwest::Client, chrome_executable: Option<String>) -> Self {
        Self {
            inner: WebStrategy::new(http_client, chrome_executable),
        }
    }
}

fn repo_scope_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[^/]+/[^/]+(/wiki(/.*)?)?$").unwrap())
}

fn md_blob_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[^/]+/[^/]+/blob/.*\.md$").unwrap())
}

#[async_trait]
impl ScraperStrategy for GithubStrategy {
    fn can_handle(&self, url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case("github.com")))
            .unwrap_or(false)
    }

    async fn process_item(&self, item: &QueueItem, options: &ScrapeOptions) -> Result<ItemResult> {
        self.inner.process_item(item, options).await
    }

    fn filter_link(&self, seed: &str, candidate: &str, options: &ScrapeOptions) -> bool {
        if !self.inner.filter_link(seed, candidate, options) {
            return false;
        }
        let Ok(url) = url::Url::parse(candidate) else {
            return false;
        };
        let path = url.path();
        repo_scope_re().is_match(path) || md_blob_re().is_match(path)
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
    }

    /// GitHub URLs are path-case-sensitive on the wire but not in practice
    /// for docs/wiki traversal; lowercase the path, drop the query, and drop
    /// the fragment (already dropped unconditionally by `normalize_url`) so
    /// equivalent GitHub URLs dedup to one visited entry (spec §4.4).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_normalizer_is_case_and_query_insensitive() {
        let strategy = GithubStrategy::new(reqwest::Client::new(), None);
        let a = strategy.normalize_for_dedup("https://GitHub.com/Owner/Repo/Wiki/Setup?tab=readme");
        let b = strategy.normalize_for_dedup("https://github.com/owner/repo/wiki/setup");
        assert_eq!(a, b);
    }

    #[test]
    fn filter_link_admits_wiki_and_md_blob_paths_only() {
        let strategy = GithubStrategy::new(reqwest::Client::new(), None);
        let seed = "https://github.com/owner/repo";
        let opts = ScrapeOptions::default();
        assert!(strategy.filter_link(seed, "https://github.com/owner/repo/wiki/Setup", &opts));
        assert!(strategy.filter_link(seed, "https://github.com/owner/repo/blob/main/README.md", &opts));
        assert!(!strategy.filter_link(seed, "https://github.com/owner/repo/issues/1", &opts));
    }
}
