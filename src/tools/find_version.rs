//! Find-version tool (spec §4.9): resolves the best stored match for
//! `(library, targetVersion?)` and reports separately whether unversioned
//! docs also exist for the library.

use super::ToolContext;
use crate::error::{IndexerError, Result};
use crate::version::{resolve, Resolution};

pub struct FindVersionRequest {
    pub library: String,
    pub target_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindVersionOutcome {
    /// `None` when only an unversioned crawl exists and nothing else
    /// matched the request.
    pub version: Option<String>,
    pub has_unversioned_docs: bool,
}

pub struct FindVersionTool<'a> {
    ctx: &'a ToolContext,
}

impl<'a> FindVersionTool<'a> {
    pub fn new(ctx: &'a ToolContext) -> Self {
        Self { ctx }
    }

    pub async fn execute(&self, request: FindVersionRequest) -> Result<FindVersionOutcome> {
        let available = self.ctx.store.query_unique_versions(&request.library).await?;
        if available.is_empty() {
            let libraries = self.ctx.store.list_libraries().await?;
            return Err(IndexerError::LibraryNotFound {
                library: request.library.clone(),
                suggestions: super::search::suggest(&request.library, &libraries),
            });
        }

        let has_unversioned = available.iter().any(|v| v.is_empty());

        match resolve(request.target_version.as_deref(), &available) {
            Some(Resolution::Version(v)) => Ok(FindVersionOutcome { version: Some(v), has_unversioned_docs: has_unversioned }),
            Some(Resolution::Unversioned) => Ok(FindVersionOutcome { version: None, has_unversioned_docs: true }),
            None if has_unversioned => Ok(FindVersionOutcome { version: None, has_unversioned_docs: true }),
            None => Err(IndexerError::VersionNotFound {
                library: request.library.clone(),
                requested: request.target_version.unwrap_or_default(),
                available,
            }),
        }
    }
}
