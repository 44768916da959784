use super::{FetchOptions, Fetcher};
use crate::error::{IndexerError, Result};
use crate::types::RawContent;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::time::Duration;

const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);
const DEFAULT_MAX_ATTEMPTS: u32 = 6;

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn can_fetch(&self, source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    async fn fetch(&self, source: &str, opts: &FetchOptions) -> Result<RawContent> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let mut req = self.client.get(source);
            for (k, v) in &opts.headers {
                req = req.header(k, v);
            }
            if let Some(t) = opts.timeout {
                req = req.timeout(t);
            }

            // reqwest's `Client` fixes its redirect policy at construction, so the
            // per-call override is applied via a request-scoped client here rather
            // than mutating the shared client.
            let send_result = if opts.follow_redirects {
                req.send().await
            } else {
                let once = reqwest::Client::builder()
                    .redirect(Policy::none())
                    .build()
                    .map_err(|e| IndexerError::Fetch {
                        url: source.to_string(),
                        status: None,
                        message: e.to_string(),
                        retryable: false,
                    })?;
                let mut req = once.get(source);
                for (k, v) in &opts.headers {
                    req = req.header(k, v);
                }
                req.send().await
            };

            let resp = match send_result {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt >= DEFAULT_MAX_ATTEMPTS {
                        return Err(IndexerError::Fetch {
                            url: source.to_string(),
                            status: None,
                            message: e.to_string(),
                            retryable: true,
                        });
                    }
                    tokio::time::sleep(DEFAULT_BASE_BACKOFF * 2u32.pow(attempt - 1)).await;
                    continue;
                }
            };

            let status = resp.status();

            if !opts.follow_redirects && status.is_redirection() {
                let location = resp
                    .headers()
                    .get("location")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                return Err(IndexerError::Redirect {
                    original_url: source.to_string(),
                    redirect_url: location,
                    status_code: status.as_u16(),
                });
            }

            if status.is_server_error() {
                if attempt >= DEFAULT_MAX_ATTEMPTS {
                    return Err(IndexerError::Fetch {
                        url: source.to_string(),
                        status: Some(status.as_u16()),
                        message: format!("server error after {attempt} attempts"),
                        retryable: true,
                    });
                }
                tokio::time::sleep(DEFAULT_BASE_BACKOFF * 2u32.pow(attempt - 1)).await;
                continue;
            }

            if status.is_client_error() {
                return Err(IndexerError::Fetch {
                    url: source.to_string(),
                    status: Some(status.as_u16()),
                    message: format!("client error {status}"),
                    retryable: false,
                });
            }

            let mime_type = resp
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.split(';').next().unwrap_or(s).trim().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let bytes = resp.bytes().await.map_err(|e| IndexerError::Fetch {
                url: source.to_string(),
                status: Some(status.as_u16()),
                message: e.to_string(),
                retryable: true,
            })?;

            return Ok(RawContent {
                bytes: bytes.to_vec(),
                mime_type,
                source: source.to_string(),
                encoding: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn retries_on_502_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(reqwest::Client::new());
        let opts = FetchOptions {
            follow_redirects: true,
            ..Default::default()
        };
        let url = format!("{}/flaky", server.uri());
        let raw = fetcher.fetch(&url, &opts).await.unwrap();
        assert_eq!(raw.bytes, b"ok");
    }

    #[tokio::test]
    async fn does_not_retry_4xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(reqwest::Client::new());
        let opts = FetchOptions {
            follow_redirects: true,
            ..Default::default()
        };
        let url = format!("{}/missing", server.uri());
        let err = fetcher.fetch(&url, &opts).await.unwrap_err();
        assert!(!err.retryable());
    }
}
