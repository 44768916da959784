use super::{Job, JobRecord, JobRunner, JobStatus};
use crate::error::{IndexerError, Result};
use crate::scrape::CancellationHandle;
use crate::types::ScrapeOptions;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

pub type StatusCallback = Arc<dyn Fn(Job) + Send + Sync>;
pub type ProgressCallback = Arc<dyn Fn(Job, crate::types::ScraperProgress) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(Job, String) + Send + Sync>;

struct Callbacks {
    on_status_change: Option<StatusCallback>,
    on_progress: Option<ProgressCallback>,
    on_error: Option<ErrorCallback>,
}

/// In-memory FIFO queue plus bounded worker pool (spec §4.8/§5, default
/// concurrency 3). `jobs`/`queue`/`active` are independently lockable so a
/// scheduling pass never holds a lock across the `.await` that runs a
/// worker.
pub struct JobManager {
    runner: Arc<dyn JobRunner>,
    concurrency: usize,
    jobs: Arc<Mutex<HashMap<Uuid, JobRecord>>>,
    queue: Arc<Mutex<VecDeque<Uuid>>>,
    active: Arc<Mutex<HashSet<Uuid>>>,
    accepting: Arc<AtomicBool>,
    callbacks: Arc<Callbacks>,
}

impl JobManager {
    pub fn new(runner: Arc<dyn JobRunner>, concurrency: usize) -> Self {
        Self {
            runner,
            concurrency: concurrency.max(1),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            active: Arc::new(Mutex::new(HashSet::new())),
            accepting: Arc::new(AtomicBool::new(false)),
            callbacks: Arc::new(Callbacks {
                on_status_change: None,
                on_progress: None,
                on_error: None,
            }),
        }
    }

    // Builder methods below must be called before the manager is shared
    // (e.g. wrapped in an `Arc`) — they rely on `Arc::get_mut` succeeding,
    // which requires a unique reference to `callbacks`.
    pub fn with_status_callback(mut self, cb: StatusCallback) -> Self {
        Arc::get_mut(&mut self.callbacks).unwrap().on_status_change = Some(cb);
        self
    }

    pub fn with_progress_callback(mut self, cb: ProgressCallback) -> Self {
        Arc::get_mut(&mut self.callbacks).unwrap().on_progress = Some(cb);
        self
    }

    pub fn with_error_callback(mut self, cb: ErrorCallback) -> Self {
        Arc::get_mut(&mut self.callbacks).unwrap().on_error = Some(cb);
        self
    }

    /// Begin processing. Idempotent.
    pub async fn start(&self) {
        self.accepting.store(true, Ordering::SeqCst);
        self.schedule().await;
    }

    /// Stop accepting new work from the queue; running jobs are not
    /// auto-cancelled.
    pub fn stop(&self) {
        self.accepting.store(false, Ordering::SeqCst);
    }

    pub async fn enqueue_job(&self, library: &str, version: &str, url: &str, options: ScrapeOptions) -> Uuid {
        let id = Uuid::new_v4();
        let job = Job {
            id,
            library: library.to_string(),
            version: version.to_string(),
            url: url.to_string(),
            options,
            status: JobStatus::Queued,
            progress: None,
            pages_scraped: 0,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        };

        {
            let mut jobs = self.jobs.lock().await;
            jobs.insert(
                id,
                JobRecord {
                    job: job.clone(),
                    cancellation: CancellationHandle::new(),
                    notify: Arc::new(Notify::new()),
                },
            );
        }
        {
            let mut queue = self.queue.lock().await;
            queue.push_back(id);
        }
        self.fire_status_change(job);
        self.schedule().await;
        id
    }

    pub async fn get_job(&self, id: Uuid) -> Option<Job> {
        self.jobs.lock().await.get(&id).map(|r| r.job.clone())
    }

    pub async fn get_jobs(&self, status_filter: Option<JobStatus>) -> Vec<Job> {
        self.jobs
            .lock()
            .await
            .values()
            .map(|r| r.job.clone())
            .filter(|j| status_filter.map(|s| s == j.status).unwrap_or(true))
            .collect()
    }

    /// Resolves on terminal transition; rejects on `Failed`/`Cancelled`.
    pub async fn wait_for_job_completion(&self, id: Uuid) -> Result<usize> {
        loop {
            let (status, error, pages_scraped, notify) = {
                let jobs = self.jobs.lock().await;
                let record = jobs.get(&id).ok_or_else(|| IndexerError::Store(format!("unknown job {id}")))?;
                (record.job.status, record.job.error.clone(), record.job.pages_scraped, record.notify.clone())
            };

            match status {
                JobStatus::Completed => return Ok(pages_scraped),
                JobStatus::Failed => {
                    return Err(IndexerError::Store(error.unwrap_or_else(|| "job failed".to_string())))
                }
                JobStatus::Cancelled => return Err(IndexerError::Cancellation { job_id: id.to_string() }),
                _ => notify.notified().await,
            }
        }
    }

    /// `Queued` -> drop from queue, transition to `Cancelled`. `Running` ->
    /// `Cancelling` + trip the cancellation handle; the worker finishes the
    /// transition to `Cancelled`. Terminal or already-`Cancelling` -> no-op.
    pub async fn cancel_job(&self, id: Uuid) -> Result<()> {
        let was_queued = {
            let mut queue = self.queue.lock().await;
            let before = queue.len();
            queue.retain(|queued_id| *queued_id != id);
            queue.len() != before
        };

        let transitioned = {
            let mut jobs = self.jobs.lock().await;
            let Some(record) = jobs.get_mut(&id) else {
                return Err(IndexerError::Store(format!("unknown job {id}")));
            };
            match record.job.status {
                JobStatus::Queued if was_queued => {
                    record.job.status = JobStatus::Cancelled;
                    record.job.finished_at = Some(Utc::now());
                    record.notify.notify_waiters();
                    Some(record.job.clone())
                }
                JobStatus::Running => {
                    record.job.status = JobStatus::Cancelling;
                    record.cancellation.trip();
                    Some(record.job.clone())
                }
                _ => None,
            }
        };

        if let Some(job) = transitioned {
            self.fire_status_change(job);
        }
        Ok(())
    }

    /// Launches new workers while `|active| < concurrency` and the queue is
    /// non-empty. Called on every scheduling opportunity: `start`,
    /// `enqueue_job`, and worker completion (spec §4.8).
    async fn schedule(&self) {
        if !self.accepting.load(Ordering::SeqCst) {
            return;
        }
        loop {
            let next_id = {
                let mut active = self.active.lock().await;
                if active.len() >= self.concurrency {
                    None
                } else {
                    let mut queue = self.queue.lock().await;
                    queue.pop_front().inspect(|id| {
                        active.insert(*id);
                    })
                }
            };

            let Some(id) = next_id else { break };
            self.spawn_worker(id);
        }
    }

    fn spawn_worker(&self, id: Uuid) {
        let jobs = self.jobs.clone();
        let active = self.active.clone();
        let accepting = self.accepting.clone();
        let callbacks = self.callbacks.clone();
        let runner = self.runner.clone();
        let manager_for_reschedule = self.clone_handles();

        tokio::spawn(async move {
            let (job, cancellation) = {
                let mut jobs_guard = jobs.lock().await;
                let record = jobs_guard.get_mut(&id).expect("worker spawned for known job");
                record.job.status = JobStatus::Running;
                record.job.started_at = Some(Utc::now());
                (record.job.clone(), record.cancellation.clone())
            };
            Self::fire_status_change_static(&callbacks, job.clone());

            let jobs_for_progress = jobs.clone();
            let callbacks_for_progress = callbacks.clone();
            let progress_job_id = id;
            let progress: crate::scrape::ProgressSink = Arc::new(move |p: crate::types::ScraperProgress| {
                let jobs = jobs_for_progress.clone();
                let callbacks = callbacks_for_progress.clone();
                let pages = p.pages_scraped;
                tokio::spawn(async move {
                    let job = {
                        let mut jobs = jobs.lock().await;
                        if let Some(record) = jobs.get_mut(&progress_job_id) {
                            record.job.progress = Some(p);
                            record.job.pages_scraped = pages;
                            record.job.clone()
                        } else {
                            return;
                        }
                    };
                    if let Some(cb) = &callbacks.on_progress {
                        cb(job.clone(), job.progress.clone().expect("just set"));
                    }
                });
            });

            let outcome = runner.run(&job.library, &job.version, &job.url, &job.options, progress, cancellation).await;

            let finished_job = {
                let mut jobs_guard = jobs.lock().await;
                let record = jobs_guard.get_mut(&id).expect("worker spawned for known job");
                record.job.finished_at = Some(Utc::now());
                match outcome {
                    Ok(pages_scraped) => {
                        record.job.pages_scraped = pages_scraped;
                        record.job.status = JobStatus::Completed;
                    }
                    Err(IndexerError::Cancellation { .. }) => {
                        record.job.status = JobStatus::Cancelled;
                        record.job.error = Some("cancelled".to_string());
                    }
                    Err(e) => {
                        record.job.status = JobStatus::Failed;
                        record.job.error = Some(e.to_string());
                    }
                }
                record.notify.notify_waiters();
                record.job.clone()
            };

            if finished_job.status == JobStatus::Failed {
                if let Some(cb) = &callbacks.on_error {
                    cb(finished_job.clone(), finished_job.error.clone().unwrap_or_default());
                }
            }
            Self::fire_status_change_static(&callbacks, finished_job);

            active.lock().await.remove(&id);
            if accepting.load(Ordering::SeqCst) {
                manager_for_reschedule.schedule().await;
            }
        });
    }

    fn fire_status_change(&self, job: Job) {
        Self::fire_status_change_static(&self.callbacks, job);
    }

    fn fire_status_change_static(callbacks: &Callbacks, job: Job) {
        if let Some(cb) = &callbacks.on_status_change {
            cb(job);
        }
    }

    /// Cheap `Arc`-clone of the handles needed to re-enter `schedule` from a
    /// spawned worker, without requiring `JobManager: Clone` at the public
    /// API boundary.
    fn clone_handles(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            concurrency: self.concurrency,
            jobs: self.jobs.clone(),
            queue: self.queue.clone(),
            active: self.active.clone(),
            accepting: self.accepting.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}
