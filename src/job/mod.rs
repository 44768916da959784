//! Component H: concurrent, cancellable job pipeline.
//!
//! Grounded on `core/app_state.rs`'s semaphore/worker-pool shape,
//! generalized into a full `Queued -> Running -> {Completed, Failed,
//! Cancelling -> Cancelled}` state machine (spec §4.8). The completion
//! future is modeled as a per-job `tokio::sync::Notify` rather than a
//! single-consumer oneshot channel, since the spec allows
//! `waitForJobCompletion` to be called more than once per job.

mod manager;
mod runner;

pub use manager::{ErrorCallback, JobManager, ProgressCallback, StatusCallback};
pub use runner::ScraperServiceRunner;

use crate::scrape::CancellationHandle;
use crate::types::{ScrapeOptions, ScraperProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelling,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub library: String,
    pub version: String,
    pub url: String,
    pub options: ScrapeOptions,
    pub status: JobStatus,
    pub progress: Option<ScraperProgress>,
    pub pages_scraped: usize,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

pub(crate) struct JobRecord {
    pub job: Job,
    pub cancellation: CancellationHandle,
    pub notify: std::sync::Arc<tokio::sync::Notify>,
}

/// The worker's view of "invoke the appropriate strategy, run the crawl,
/// split documents, and stream chunks into the store" — the `ScraperService`
/// shim of spec §4.8, abstracted so the manager doesn't depend on the
/// concrete store/splitter/embedder wiring.
#[async_trait::async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(
        &self,
        library: &str,
        version: &str,
        url: &str,
        options: &ScrapeOptions,
        progress: crate::scrape::ProgressSink,
        cancellation: CancellationHandle,
    ) -> crate::error::Result<usize>;
}
