//! Component F: SQLite-backed hybrid (vector + lexical) document store.
//!
//! Grounded on `other_examples/docstore_core.rs` (schema/pragma/connection
//! shape, FTS5 query escaping) and `other_examples/agentroot-core/search/
//! hybrid.rs` (Reciprocal Rank Fusion). `rusqlite::Connection` is neither
//! `Sync` nor safely shareable across an `.await`, so every call is proxied
//! through `tokio::task::spawn_blocking` over a `std::sync::Mutex`-guarded
//! connection — the same "blocking I/O behind an async facade" shape the
//! teacher uses for its headless-browser and filesystem calls.

pub mod embedding;
mod hybrid;
mod schema;

pub use embedding::{embedding_text, EmbeddingClient, FixedDimensionEmbedder};
pub use hybrid::{HybridHit, DEFAULT_RRF_K};

use crate::error::{IndexerError, Result};
use crate::types::{ContentChunk, DocumentMetadata, StoredDocument};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
    dimension: usize,
}

impl DocumentStore {
    pub async fn open(path: &Path, dimension: usize) -> Result<Self> {
        let path = path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| IndexerError::Store(e.to_string()))?;
            }
            let conn = Connection::open(path)?;
            schema::init_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|e| IndexerError::Store(e.to_string()))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            dimension,
        })
    }

    /// In-memory store (no file on disk) — used by tests and by any caller
    /// that wants a throwaway index for a single process lifetime.
    pub async fn open_in_memory(dimension: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().expect("store mutex poisoned");
            f(&conn)
        })
        .await
        .map_err(|e| IndexerError::Store(e.to_string()))?
    }

    /// Replaces every chunk of one page (`library`, `version`, `url`) in a
    /// single transaction: deletes any prior chunks for that page (so a
    /// re-crawl of the same URL within a job is idempotent), inserts
    /// `documents` rows with contiguous 0-based `sort_order`, and their
    /// matching `documents_vec` rows. The `documents_fts` row is populated
    /// by the insert trigger (spec §4.6).
    pub async fn insert_page(
        &self,
        library: &str,
        version: &str,
        url: &str,
        title: &str,
        chunks: Vec<ContentChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<()> {
        debug_assert_eq!(chunks.len(), embeddings.len());
        let library = library.to_string();
        let version = version.to_string();
        let url = url.to_string();
        let title = title.to_string();
        let dimension = self.dimension;

        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "DELETE FROM documents WHERE library = ?1 AND version = ?2 AND url = ?3",
                rusqlite::params![library, version, url],
            )?;

            for (sort_order, (chunk, embedding)) in chunks.into_iter().zip(embeddings.into_iter()).enumerate() {
                if embedding.len() != dimension {
                    return Err(IndexerError::Dimension {
                        expected: dimension,
                        actual: embedding.len(),
                    });
                }
                let metadata = DocumentMetadata {
                    title: title.clone(),
                    url: url.clone(),
                    library: library.clone(),
                    version: version.clone(),
                    level: chunk.level,
                    path: chunk.path.clone(),
                };
                let metadata_json = serde_json::to_string(&metadata).map_err(|e| IndexerError::Store(e.to_string()))?;

                tx.execute(
                    "INSERT INTO documents (library, version, url, content, metadata, sort_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![library, version, url, chunk.content, metadata_json, sort_order as i64],
                )?;
                let id = tx.last_insert_rowid();

                tx.execute(
                    "INSERT INTO documents_vec (rowid, library, version, embedding) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![id, library, version, embedding_to_blob(&embedding)],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Removes every row for `library` (case-folded), optionally scoped to
    /// one `version`. Triggers cascade the deletion to `documents_fts` and
    /// `documents_vec` (spec §4.6/§8).
    pub async fn remove(&self, library: &str, version: Option<&str>) -> Result<usize> {
        let library = library.to_lowercase();
        let version = version.map(|v| v.to_lowercase());
        self.with_conn(move |conn| {
            let affected = match version {
                Some(v) => conn.execute(
                    "DELETE FROM documents WHERE lower(library) = ?1 AND lower(version) = ?2",
                    rusqlite::params![library, v],
                )?,
                None => conn.execute("DELETE FROM documents WHERE lower(library) = ?1", rusqlite::params![library])?,
            };
            Ok(affected)
        })
        .await
    }

    pub async fn query_unique_versions(&self, library: &str) -> Result<Vec<String>> {
        let library = library.to_lowercase();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT version FROM documents WHERE lower(library) = ?1 ORDER BY version",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![library], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn list_libraries(&self) -> Result<Vec<(String, Vec<String>)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT library, version FROM documents ORDER BY library, version")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
            for (library, version) in rows {
                match grouped.iter_mut().find(|(l, _)| *l == library) {
                    Some((_, versions)) => versions.push(version),
                    None => grouped.push((library, vec![version])),
                }
            }
            Ok(grouped)
        })
        .await
    }

    pub async fn get_document(&self, id: i64) -> Result<Option<StoredDocument>> {
        self.with_conn(move |conn| schema::get_document(conn, id)).await
    }

    /// `findParentChunk` (spec §4.6): the document in the same page whose
    /// path equals `path[:-1]`; `None` if the anchor is already a root.
    pub async fn find_parent_chunk(&self, id: i64) -> Result<Option<StoredDocument>> {
        self.with_conn(move |conn| {
            let Some((group, index)) = load_page_group(conn, id)? else {
                return Ok(None);
            };
            let anchor = &group[index];
            if anchor.metadata.path.is_empty() {
                return Ok(None);
            }
            let parent_path = &anchor.metadata.path[..anchor.metadata.path.len() - 1];
            Ok(group.into_iter().find(|d| d.metadata.path == parent_path))
        })
        .await
    }

    /// Up to `n` documents immediately preceding the anchor with the same
    /// path, in original (ascending `sort_order`) order.
    pub async fn find_preceding_sibling_chunks(&self, id: i64, n: usize) -> Result<Vec<StoredDocument>> {
        self.with_conn(move |conn| {
            let Some((group, index)) = load_page_group(conn, id)? else {
                return Ok(Vec::new());
            };
            let anchor_path = group[index].metadata.path.clone();
            let mut preceding: Vec<StoredDocument> = group[..index]
                .iter()
                .rev()
                .filter(|d| d.metadata.path == anchor_path)
                .take(n)
                .cloned()
                .collect();
            preceding.reverse();
            Ok(preceding)
        })
        .await
    }

    /// Up to `n` documents immediately following the anchor with the same
    /// path.
    pub async fn find_subsequent_sibling_chunks(&self, id: i64, n: usize) -> Result<Vec<StoredDocument>> {
        self.with_conn(move |conn| {
            let Some((group, index)) = load_page_group(conn, id)? else {
                return Ok(Vec::new());
            };
            let anchor_path = group[index].metadata.path.clone();
            Ok(group[index + 1..]
                .iter()
                .filter(|d| d.metadata.path == anchor_path)
                .take(n)
                .cloned()
                .collect())
        })
        .await
    }

    /// Up to `n` documents whose path is exactly one level deeper than the
    /// anchor's and begins with the anchor's path.
    pub async fn find_child_chunks(&self, id: i64, n: usize) -> Result<Vec<StoredDocument>> {
        self.with_conn(move |conn| {
            let Some((group, index)) = load_page_group(conn, id)? else {
                return Ok(Vec::new());
            };
            let anchor_path = group[index].metadata.path.clone();
            let child_len = anchor_path.len() + 1;
            Ok(group
                .into_iter()
                .filter(|d| d.metadata.path.len() == child_len && d.metadata.path[..anchor_path.len()] == anchor_path[..])
                .take(n)
                .collect())
        })
        .await
    }

    /// Hybrid search (spec §4.6): vector top-k by ascending distance fused
    /// via Reciprocal Rank Fusion with BM25 lexical top-k, scoped to
    /// `(library, version)`.
    pub async fn hybrid_search(
        &self,
        library: &str,
        version: &str,
        query_text: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<HybridHit>> {
        if query_embedding.len() != self.dimension {
            return Err(IndexerError::Dimension {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }
        let library = library.to_lowercase();
        let version = version.to_lowercase();
        let query_text = query_text.to_string();
        let query_embedding = query_embedding.to_vec();
        self.with_conn(move |conn| hybrid::search(conn, &library, &version, &query_text, &query_embedding, limit))
            .await
    }
}

/// Loads every document sharing `(library, version, url)` with `anchor_id`,
/// ordered by `sort_order`, plus the anchor's index within that group.
fn load_page_group(conn: &Connection, anchor_id: i64) -> Result<Option<(Vec<StoredDocument>, usize)>> {
    let Some(anchor) = schema::get_document(conn, anchor_id)? else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(
        "SELECT id, library, version, url, content, metadata, sort_order
         FROM documents WHERE library = ?1 AND version = ?2 AND url = ?3 ORDER BY sort_order",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![anchor.library, anchor.version, anchor.url],
            schema::row_to_document,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let index = rows.iter().position(|d| d.id == anchor_id).unwrap_or(0);
    Ok(Some((rows, index)))
}

pub fn embedding_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn blob_to_embedding(b: &[u8]) -> Vec<f32> {
    b.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkType;
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
    async fn insert_then_remove_clears_everything() {
        let store = DocumentStore::open_in_memory(4).await.unwrap();
        store
            .insert_page(
                "react",
                "18.2.0",
                "https://react.dev/learn",
                "Learn React",
                vec![chunk("hooks let you use state", 1, &[])],
                vec![vec![0.1, 0.2, 0.3, 0.4]],
            )
            .await
            .unwrap();

        let versions = store.query_unique_versions("react").await.unwrap();
        assert_eq!(versions, vec!["18.2.0".to_string()]);

        store.remove("react", Some("18.2.0")).await.unwrap();
        let versions = store.query_unique_versions("react").await.unwrap();
        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn sort_order_is_contiguous_per_page() {
        let store = DocumentStore::open_in_memory(4).await.unwrap();
        store
            .insert_page(
                "vue",
                "",
                "https://vuejs.org/guide",
                "Guide",
                vec![chunk("a", 1, &[]), chunk("b", 2, &["A"]), chunk("c", 2, &["A"])],
                vec![vec![0.0; 4], vec![0.0; 4], vec![0.0; 4]],
            )
            .await
            .unwrap();

        let doc0 = store.get_document(1).await.unwrap().unwrap();
        assert_eq!(doc0.sort_order, 0);
        let doc2 = store.get_document(3).await.unwrap().unwrap();
        assert_eq!(doc2.sort_order, 2);
    }

    #[tokio::test]
    async fn hierarchical_navigation_finds_parent_and_children() {
        let store = DocumentStore::open_in_memory(4).await.unwrap();
        store
            .insert_page(
                "lib",
                "",
                "https://example.com/docs",
                "Docs",
                vec![
                    chunk("root", 1, &[]),
                    chunk("child one", 2, &["Root"]),
                    chunk("child two", 2, &["Root"]),
                ],
                vec![vec![0.0; 4], vec![0.0; 4], vec![0.0; 4]],
            )
            .await
            .unwrap();

        let children = store.find_child_chunks(1, 5).await.unwrap();
        assert_eq!(children.len(), 2);

        let parent = store.find_parent_chunk(2).await.unwrap().unwrap();
        assert_eq!(parent.id, 1);

        let subsequent = store.find_subsequent_sibling_chunks(2, 5).await.unwrap();
        assert_eq!(subsequent.len(), 1);
        assert_eq!(subsequent[0].id, 3);
    }
}
