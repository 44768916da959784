//! Remove tool (spec §4.9) — deletes every stored chunk for a library,
//! optionally scoped to one version.

use super::ToolContext;
use crate::error::Result;

pub struct RemoveRequest {
    pub library: String,
    pub version: Option<String>,
}

pub struct RemoveTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> RemoveTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, request: RemoveRequest) -> Result<usize> {
        self.ctx.store.remove(&request.library, request.version.as_deref()).await
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
    async fn removes_only_the_requested_version() {
        let store = Arc::new(DocumentStore::open_in_memory(4).await.unwrap());
        for version in ["1.0.0", "2.0.0"] {
            store
                .insert_page(
                    "react",
                    version,
                    "https://react.dev",
                    "React",
                    vec![crate::types::ContentChunk {
                        types: [crate::types::ChunkType::Text].into_iter().collect(),
                        content: "hooks".to_string(),
                        level: 1,
                        path: vec![],
                    }],
                    vec![vec![0.0; 4]],
                )
                .await
                .unwrap();
        }

        let embedder = Arc::new(FixedDimensionEmbedder::probe(Arc::new(NullEmbedder), 4, false).await.unwrap());
        let registry = Arc::new(StrategyRegistry::new(Vec::new()));
        let runner = Arc::new(ScraperServiceRunner::new(registry, store.clone(), embedder.clone()));
        let jobs = Arc::new(JobManager::new(runner, 1));

        let ctx = ToolContext { store: store.clone(), jobs, embedder };
        let tool = RemoveTool::new(&ctx);
        tool.execute(RemoveRequest { library: "react".to_string(), version: Some("1.0.0".to_string()) }).await.unwrap();

        let versions = store.query_unique_versions("react").await.unwrap();
        assert_eq!(versions, vec!["2.0.0".to_string()]);
    }
}
