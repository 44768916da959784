//! Component G: search + hierarchical context expansion.
//!
//! Pure logic over the store (component F) — no teacher module does this
//! directly; grounded in spec §4.7's fixed composition order.

use crate::store::DocumentStore;
use crate::error::Result;
use serde::{Deserialize, Serialize};

const DEFAULT_INITIAL_HIT_BUDGET: usize = 10;
const MAX_PRECEDING: usize = 2;
const MAX_SUBSEQUENT: usize = 2;
const MAX_CHILDREN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedAnswer {
    pub url: String,
    pub content: String,
    pub score: f64,
}

pub struct Retriever<'a> {
    store: &'a DocumentStore,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// `(library, version, query, limit)` — spec §4.7. `version` is
    /// normalized to `""` when absent.
    pub async fn retrieve(
        &self,
        library: &str,
        version: Option<&str>,
        query: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedAnswer>> {
        let version = version.unwrap_or("");
        let hits = self
            .store
            .hybrid_search(library, version, query, query_embedding, DEFAULT_INITIAL_HIT_BUDGET.max(limit))
            .await?;

        let mut answers = Vec::with_capacity(limit.min(hits.len()));
        for hit in hits.into_iter().take(limit) {
            let expanded = self.expand(hit.document.id, &hit.document.content).await?;
            answers.push(RetrievedAnswer {
                url: hit.document.url.clone(),
                content: expanded,
                score: hit.score,
            });
        }
        Ok(answers)
    }

    /// Composes `parent \n\n preceding(≤2) \n\n hit \n\n children(≤5) \n\n
    /// subsequent(≤2)`, skipping missing components without leaving
    /// dangling separators (spec §4.7/§8 scenario 5).
    async fn expand(&self, hit_id: i64, hit_content: &str) -> Result<String> {
        let parent = self.store.find_parent_chunk(hit_id).await?;
        let preceding = self.store.find_preceding_sibling_chunks(hit_id, MAX_PRECEDING).await?;
        let children = self.store.find_child_chunks(hit_id, MAX_CHILDREN).await?;
        let subsequent = self.store.find_subsequent_sibling_chunks(hit_id, MAX_SUBSEQUENT).await?;

        let mut parts: Vec<String> = Vec::new();
        if let Some(parent) = parent {
            parts.push(parent.content);
        }
        parts.extend(preceding.into_iter().map(|d| d.content));
        parts.push(hit_content.to_string());
        parts.extend(children.into_iter().map(|d| d.content));
        parts.extend(subsequent.into_iter().map(|d| d.content));

        Ok(parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkType, ContentChunk};
    use std::collections::HashSet;

    fn chunk(content: &str, level: u8, path: &[&str]) -> ContentChunk {
        let mut types = HashSet::new();
        types.insert(ChunkType::Text);
        ContentChunk {
            types,
            content: content.to_string(),
            level,
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn expansion_has_no_dangling_separators_when_hit_is_root() {
        let store = DocumentStore::open_in_memory(4).await.unwrap();
        store
            .insert_page(
                "lib",
                "",
                "https://example.com/docs",
                "Docs",
                vec![chunk("only section", 1, &[])],
                vec![vec![1.0, 0.0, 0.0, 0.0]],
            )
            .await
            .unwrap();

        let retriever = Retriever::new(&store);
        let results = retriever
            .retrieve("lib", None, "section", &[1.0, 0.0, 0.0, 0.0], 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "only section");
    }

    #[tokio::test]
    async fn expansion_includes_parent_and_children() {
        let store = DocumentStore::open_in_memory(4).await.unwrap();
        store
            .insert_page(
                "lib",
                "",
                "https://example.com/docs",
                "Docs",
                vec![
                    chunk("root section about hooks", 1, &[]),
                    chunk("child one", 2, &["Root"]),
                    chunk("child two", 2, &["Root"]),
                ],
                vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 0.0]],
            )
            .await
            .unwrap();

        let retriever = Retriever::new(&store);
        let results = retriever
            .retrieve("lib", None, "hooks", &[1.0, 0.0, 0.0, 0.0], 5)
            .await
            .unwrap();
        let hit = &results[0];
        assert!(hit.content.contains("root section about hooks"));
    }
}
