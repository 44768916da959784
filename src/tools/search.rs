//! Search tool (spec §4.9): validates `exactMatch`/version preconditions,
//! fuzzy-suggests library names on a miss, resolves the version against the
//! stored set, and queries the retriever.

use super::ToolContext;
use crate::error::{IndexerError, Result};
use crate::retriever::{RetrievedAnswer, Retriever};
use crate::version::{resolve, Resolution};
use strsim::jaro_winkler;

const SUGGESTION_LIMIT: usize = 3;
const SUGGESTION_THRESHOLD: f64 = 0.7;

pub struct SearchRequest {
    pub library: String,
    pub version: Option<String>,
    pub query: String,
    pub limit: usize,
    /// If set, a missing or `"latest"` version is a hard `version-not-found`
    /// rather than falling back to the highest stable version (spec §4.9).
    pub exact_match: bool,
}

pub struct SearchTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> SearchTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, request: SearchRequest) -> Result<Vec<RetrievedAnswer>> {
        if request.exact_match && matches!(request.version.as_deref(), None | Some("") | Some("latest")) {
            return Err(IndexerError::VersionNotFound {
                library: request.library.clone(),
                requested: request.version.clone().unwrap_or_default(),
                available: Vec::new(),
            });
        }

        let libraries = self.ctx.store.list_libraries().await?;
        let Some((_, available)) = libraries.iter().find(|(lib, _)| lib.eq_ignore_ascii_case(&request.library)) else {
            return Err(IndexerError::LibraryNotFound {
                library: request.library.clone(),
                suggestions: suggest(&request.library, &libraries),
            });
        };

        let resolution = resolve(request.version.as_deref(), available).ok_or_else(|| IndexerError::VersionNotFound {
            library: request.library.clone(),
            requested: request.version.clone().unwrap_or_default(),
            available: available.clone(),
        })?;
        let resolved_version = match resolution {
            Resolution::Version(v) => v,
            Resolution::Unversioned => String::new(),
        };

        let query_embedding = self.ctx.embedder.embed(&request.query).await?;
        let retriever = Retriever::new(&self.ctx.store);
        retriever
            .retrieve(&request.library, Some(&resolved_version), &request.query, &query_embedding, request.limit)
            .await
    }
}

/// Tolerant string-match suggestions for a library-name miss, ranked by
/// Jaro-Winkler similarity. Only names above `SUGGESTION_THRESHOLD` are
/// offered — a low-confidence match is worse than no suggestion.
pub(super) fn suggest(requested: &str, libraries: &[(String, Vec<String>)]) -> Vec<String> {
    let requested = requested.to_lowercase();
    let mut scored: Vec<(f64, &str)> =
        libraries.iter().map(|(name, _)| (jaro_winkler(&requested, &name.to_lowercase()), name.as_str())).collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().filter(|(score, _)| *score >= SUGGESTION_THRESHOLD).take(SUGGESTION_LIMIT).map(|(_, name)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_names_only() {
        let libraries = vec![("react".to_string(), vec![]), ("vue".to_string(), vec![])];
        let suggestions = suggest("reactt", &libraries);
        assert_eq!(suggestions, vec!["react".to_string()]);

        let suggestions = suggest("zzzzz", &libraries);
        assert!(suggestions.is_empty());
    }
}
