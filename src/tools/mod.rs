//! Component I: thin command objects over the core (spec §4.9).
//!
//! Grounded in the teacher's `core/tools_registry.rs` registry shape and
//! `mcp/tooling.rs` tool catalog, reorganized behind the spec's plain
//! in-process `execute(options) -> Result<Outcome>` contract rather than a
//! JSON-RPC tool registry (the wire protocol is out of scope per spec §1).

mod find_version;
mod job_control;
mod list;
mod remove;
mod scrape;
mod search;

pub use find_version::{FindVersionOutcome, FindVersionRequest, FindVersionTool};
pub use job_control::{CancelJobTool, GetJobInfoTool};
pub use list::{ListJobsTool, ListLibrariesTool};
pub use remove::{RemoveRequest, RemoveTool};
pub use scrape::{ScrapeOutcome, ScrapeRequest, ScrapeTool};
pub use search::{SearchRequest, SearchTool};

use crate::job::JobManager;
use crate::store::{DocumentStore, FixedDimensionEmbedder};
use std::sync::Arc;

/// Shared handles every tool is constructed from. Not a god-object: tools
/// hold only the handles they individually need (spec §4.9 — "thin
/// orchestrators").
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<DocumentStore>,
    pub jobs: Arc<JobManager>,
    pub embedder: Arc<FixedDimensionEmbedder>,
}
