//! In-process job queue with a single background worker
//!
//! Jobs become observable as `Queued` the moment they are enqueued and
//! execute FIFO by creation time, one at a time. The CPU-bound transform runs
//! on the blocking pool so the request scheduler never stalls. A failed or
//! panicked transform marks the job `Failed`; jobs are never dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::Error;

use super::job::{Job, JobStatus};
use super::processor::run_transform;
use super::storage::Storage;

/// How long the worker sleeps when the queue is empty
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Pause between consecutive jobs
const INTER_JOB_PAUSE: Duration = Duration::from_millis(50);

/// Cheaply cloneable handle to the shared job queue
#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    /// All job records for the process lifetime, keyed by id
    jobs: Mutex<HashMap<Uuid, Job>>,
    storage: Arc<Storage>,
    /// Cleared on shutdown; enqueue refuses afterwards
    accepting: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JobQueue {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                jobs: Mutex::new(HashMap::new()),
                storage,
                accepting: AtomicBool::new(true),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Store a job and make sure the background worker is running
    ///
    /// The job is observable as `Queued` immediately. Fails with
    /// `Precondition` once the queue has been closed.
    pub fn enqueue(&self, job: Job) -> Result<Job, Error> {
        if !self.inner.accepting.load(Ordering::SeqCst) {
            return Err(Error::Precondition("queue is shutting down".into()));
        }

        {
            let mut jobs = self.inner.jobs.lock().expect("job map lock");
            jobs.insert(job.job_id, job.clone());
        }
        info!(job_id = %job.job_id, tenant = %job.tenant_id, "enqueued job");

        self.ensure_worker();
        Ok(job)
    }

    /// Fetch a job by id
    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        self.inner.jobs.lock().expect("job map lock").get(&job_id).cloned()
    }

    /// A tenant's jobs, newest first, capped at `limit`
    pub fn list(&self, tenant_id: &str, limit: usize) -> Vec<Job> {
        let jobs = self.inner.jobs.lock().expect("job map lock");
        let mut tenant_jobs: Vec<Job> = jobs
            .values()
            .filter(|j| j.tenant_id == tenant_id)
            .cloned()
            .collect();
        tenant_jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tenant_jobs.truncate(limit);
        tenant_jobs
    }

    /// Replace a job record by id
    pub fn update(&self, job: Job) {
        commit(&self.inner, job);
    }

    /// Stop accepting new jobs
    pub fn close(&self) {
        self.inner.accepting.store(false, Ordering::SeqCst);
    }

    /// Close the queue and wait for the worker to drain and exit
    pub async fn shutdown(&self) {
        self.close();
        let handle = self.inner.worker.lock().expect("worker lock").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Spawn the single worker task unless one is already alive
    fn ensure_worker(&self) {
        let mut worker = self.inner.worker.lock().expect("worker lock");
        let running = worker.as_ref().map_or(false, |h| !h.is_finished());
        if !running {
            let inner = Arc::clone(&self.inner);
            *worker = Some(tokio::spawn(worker_loop(inner)));
        }
    }
}

/// Background worker: drain queued jobs oldest-first until shut down
async fn worker_loop(inner: Arc<QueueInner>) {
    info!("queue worker started");

    loop {
        let next = {
            let jobs = inner.jobs.lock().expect("job map lock");
            jobs.values()
                .filter(|j| j.status == JobStatus::Queued)
                .min_by_key(|j| j.created_at)
                .cloned()
        };

        match next {
            None => {
                if !inner.accepting.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(IDLE_POLL).await;
            }
            Some(job) => {
                process_one(&inner, job).await;
                tokio::time::sleep(INTER_JOB_PAUSE).await;
            }
        }
    }

    info!("queue worker stopped");
}

/// Run one job to a terminal state
async fn process_one(inner: &Arc<QueueInner>, mut job: Job) {
    let job_id = job.job_id;
    info!(job_id = %job_id, "processing job");

    job.status = JobStatus::Processing;
    job.started_at = Some(chrono::Utc::now());
    job.progress = 10;
    commit(inner, job.clone());

    // CPU-bound transform runs off the cooperative scheduler
    let storage = Arc::clone(&inner.storage);
    let task_job = job.clone();
    let result = tokio::task::spawn_blocking(move || run_transform(&task_job, &storage)).await;

    match result {
        Ok(Ok((output_path, stats))) => {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.output_path = Some(output_path);
            job.stats = Some(stats);
        }
        Ok(Err(e)) => {
            error!(job_id = %job_id, error = %e, "job failed");
            job.status = JobStatus::Failed;
            job.error = Some(e.to_string());
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "job task panicked");
            job.status = JobStatus::Failed;
            job.error = Some(format!("processing task failed: {}", e));
        }
    }
    job.completed_at = Some(chrono::Utc::now());
    commit(inner, job);

    info!(job_id = %job_id, "job finished");
}

fn commit(inner: &Arc<QueueInner>, job: Job) {
    let mut jobs = inner.jobs.lock().expect("job map lock");
    jobs.insert(job.job_id, job);
}
