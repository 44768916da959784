//! Reciprocal Rank Fusion over BM25 lexical + brute-force cosine vector
//! search, grounded on `other_examples/agentroot-core/search/hybrid.rs`'s
//! `rrf_fusion` (this implementation drops its reranker/query-expansion
//! bonus scoring, which has no counterpart in the spec's plain RRF).

use super::blob_to_embedding;
use super::schema;
use crate::error::Result;
use crate::types::StoredDocument;
use rusqlite::Connection;
use std::collections::HashMap;

pub const DEFAULT_RRF_K: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct HybridHit {
    pub document: StoredDocument,
    pub score: f64,
}

/// Wraps the full query in double quotes, doubling any internal `"` — a
/// safe phrase match regardless of user-supplied FTS5 operators (spec
/// §4.6).
pub fn escape_fts_query(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub fn search(
    conn: &Connection,
    library: &str,
    version: &str,
    query_text: &str,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<HybridHit>> {
    let vector_ranked = vector_search(conn, library, version, query_embedding, limit)?;
    let lexical_ranked = lexical_search(conn, library, version, query_text, limit)?;

    let mut fused: HashMap<i64, f64> = HashMap::new();
    for (rank, id) in vector_ranked.iter().enumerate() {
        *fused.entry(*id).or_insert(0.0) += 1.0 / (DEFAULT_RRF_K + (rank + 1) as f64);
    }
    for (rank, id) in lexical_ranked.iter().enumerate() {
        *fused.entry(*id).or_insert(0.0) += 1.0 / (DEFAULT_RRF_K + (rank + 1) as f64);
    }

    let mut scored: Vec<(i64, f64)> = fused.into_iter().collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    let mut hits = Vec::with_capacity(scored.len());
    for (id, score) in scored {
        if let Some(document) = schema::get_document(conn, id)? {
            hits.push(HybridHit { document, score });
        }
    }
    Ok(hits)
}

fn vector_search(conn: &Connection, library: &str, version: &str, query: &[f32], limit: usize) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT rowid, embedding FROM documents_vec WHERE lower(library) = ?1 AND lower(version) = ?2",
    )?;
    let rows: Vec<(i64, Vec<u8>)> = stmt
        .query_map(rusqlite::params![library, version], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut distances: Vec<(i64, f64)> = rows
        .into_iter()
        .map(|(id, blob)| (id, cosine_distance(query, &blob_to_embedding(&blob))))
        .collect();
    distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    distances.truncate(limit);
    Ok(distances.into_iter().map(|(id, _)| id).collect())
}

fn lexical_search(conn: &Connection, library: &str, version: &str, query_text: &str, limit: usize) -> Result<Vec<i64>> {
    let escaped = escape_fts_query(query_text);
    let mut stmt = conn.prepare(
        "SELECT d.id FROM documents_fts f
         JOIN documents d ON d.id = f.rowid
         WHERE f MATCH ?1 AND lower(d.library) = ?2 AND lower(d.version) = ?3
         ORDER BY bm25(documents_fts, 10.0, 1.0, 5.0, 1.0) ASC
         LIMIT ?4",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![escaped, library, version, limit as i64], |row| row.get::<_, i64>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_query_is_phrase_wrapped_and_escapes_quotes() {
        assert_eq!(escape_fts_query("hooks"), "\"hooks\"");
        assert_eq!(escape_fts_query("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn cosine_distance_is_zero_for_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!(cosine_distance(&v, &v).abs() < 1e-9);
    }
}
