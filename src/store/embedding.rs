//! Fixed-dimension wrapper (spec §4.6/§9): makes any embedding model
//! conform to the store's canonical vector length `D` by zero-padding or
//! (opt-in) truncation.

use crate::error::{IndexerError, Result};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

/// The external embedding-model collaborator. Out of scope per spec §1 —
/// the spec fixes only this contract.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Probes the model once at construction with a sentinel string, then
/// conforms every subsequent embedding to `dimension`. Caches embeddings by
/// exact text match so re-ingesting an unchanged chunk never re-calls the
/// model — grounded in the teacher's `moka` response-cache pattern.
pub struct FixedDimensionEmbedder {
    inner: Arc<dyn EmbeddingClient>,
    dimension: usize,
    allow_truncate: bool,
    cache: Cache<String, Vec<f32>>,
}

impl FixedDimensionEmbedder {
    /// Probes the model by embedding a sentinel string. A model whose
    /// native dimension exceeds `dimension` fails fast with a **dimension**
    /// error unless `allow_truncate` is set (spec §4.6).
    pub async fn probe(
        inner: Arc<dyn EmbeddingClient>,
        dimension: usize,
        allow_truncate: bool,
    ) -> Result<Self> {
        let sentinel = inner.embed("dimension-probe-sentinel").await?;
        if sentinel.len() > dimension && !allow_truncate {
            return Err(IndexerError::Dimension {
                expected: dimension,
                actual: sentinel.len(),
            });
        }
        Ok(Self {
            inner,
            dimension,
            allow_truncate,
            cache: Cache::builder().max_capacity(10_000).build(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.get(text).await {
            return Ok(hit);
        }
        let raw = self.inner.embed(text).await?;
        let conformed = self.conform(raw)?;
        self.cache.insert(text.to_string(), conformed.clone()).await;
        Ok(conformed)
    }

    fn conform(&self, v: Vec<f32>) -> Result<Vec<f32>> {
        match v.len().cmp(&self.dimension) {
            std::cmp::Ordering::Equal => Ok(v),
            std::cmp::Ordering::Less => {
                let mut padded = v;
                padded.resize(self.dimension, 0.0);
                Ok(padded)
            }
            std::cmp::Ordering::Greater => {
                if self.allow_truncate {
                    let mut v = v;
                    v.truncate(self.dimension);
                    Ok(v)
                } else {
                    Err(IndexerError::Dimension {
                        expected: self.dimension,
                        actual: v.len(),
                    })
                }
            }
        }
    }
}

/// The text embedded for a chunk: titles and breadcrumbs influence
/// retrieval (spec §4.6 invariant).
pub fn embedding_text(title: &str, url: &str, path: &[String], content: &str) -> String {
    format!(
        "<title>{title}</title>\n<url>{url}</url>\n<path>{}</path>\n{content}",
        path.join(" / ")
    )
}
