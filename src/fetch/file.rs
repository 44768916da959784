use super::{FetchOptions, Fetcher};
use crate::error::{IndexerError, Result};
use crate::types::RawContent;
use async_trait::async_trait;
use url::Url;

pub struct FileFetcher;

fn mime_for_extension(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(|s| s.to_lowercase()) {
        Some(ref ext) if ext == "html" || ext == "htm" => "text/html",
        Some(ref ext) if ext == "md" => "text/markdown",
        Some(ref ext) if ext == "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    fn can_fetch(&self, source: &str) -> bool {
        source.starts_with("file://")
    }

    async fn fetch(&self, source: &str, _opts: &FetchOptions) -> Result<RawContent> {
        let url = Url::parse(source).map_err(|e| IndexerError::InvalidUrl {
            url: source.to_string(),
            reason: e.to_string(),
        })?;
        let path = url.to_file_path().map_err(|_| IndexerError::InvalidUrl {
            url: source.to_string(),
            reason: "not a valid file path".to_string(),
        })?;

        let mime_type = mime_for_extension(&path).to_string();
        let bytes = tokio::fs::read(&path).await.map_err(|e| IndexerError::Fetch {
            url: source.to_string(),
            status: None,
            message: e.to_string(),
            retryable: false,
        })?;

        Ok(RawContent {
            bytes,
            mime_type,
            source: source.to_string(),
            encoding: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn derives_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("page.md");
        tokio::fs::write(&file_path, "# hi").await.unwrap();
        let url = Url::from_file_path(&file_path).unwrap().to_string();

        let fetcher = FileFetcher;
        let raw = fetcher.fetch(&url, &FetchOptions::default()).await.unwrap();
        assert_eq!(raw.mime_type, "text/markdown");
        assert_eq!(raw.bytes, b"# hi");
    }
}
