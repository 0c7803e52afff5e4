//! Typed request handlers
//!
//! The whole request surface lives here as plain functions over plain data;
//! the HTTP layer only extracts arguments and converts results. That keeps
//! validation, ownership checks, and projections testable without a server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::Error;
use crate::processor::ProcessingStats;
use crate::scene::SCENE_EXTENSION;
use crate::stroke::Preset;

use super::job::{Job, JobStatus};
use super::queue::JobQueue;
use super::storage::{FileRole, Storage};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub queue: JobQueue,
    pub storage: Arc<Storage>,
}

/// Response after submitting a transform job
#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// Job status projection
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProcessingStats>,
}

/// Single item in transform history
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub preset: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transform history for one tenant
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub transforms: Vec<HistoryItem>,
    pub total: usize,
}

/// A downloadable artifact
#[derive(Debug)]
pub struct DownloadPayload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Validate an upload, persist it, and enqueue a job
pub fn submit_transform(
    state: &AppState,
    tenant_id: &str,
    filename: &str,
    content: &[u8],
    preset: &str,
) -> Result<TransformResponse, Error> {
    if !filename.ends_with(SCENE_EXTENSION) {
        return Err(Error::BadRequest("File must be a .rm file".into()));
    }

    let limit_bytes = state.config.max_file_size_mb * 1024 * 1024;
    if content.len() as u64 > limit_bytes {
        return Err(Error::TooLarge(format!(
            "File size ({:.1}MB) exceeds limit ({}MB)",
            content.len() as f64 / (1024.0 * 1024.0),
            state.config.max_file_size_mb
        )));
    }

    if !Preset::is_valid(preset) {
        return Err(Error::BadRequest(format!(
            "Invalid preset '{}'. Must be one of: minimal, medium, aggressive",
            preset
        )));
    }

    let mut job = Job::new(tenant_id, preset, filename, Default::default());
    job.input_path = state
        .storage
        .save(tenant_id, job.job_id, FileRole::Input, filename, content)?;

    let job = state.queue.enqueue(job)?;

    Ok(TransformResponse {
        job_id: job.job_id,
        status: job.status,
        created_at: job.created_at,
    })
}

/// Look up a job, enforcing tenant ownership
fn owned_job(state: &AppState, tenant_id: &str, job_id: Uuid) -> Result<Job, Error> {
    let job = state
        .queue
        .get(job_id)
        .ok_or_else(|| Error::NotFound(format!("job {}", job_id)))?;
    if job.tenant_id != tenant_id {
        return Err(Error::Forbidden);
    }
    Ok(job)
}

/// Project a job's current status
pub fn job_status(
    state: &AppState,
    tenant_id: &str,
    job_id: Uuid,
) -> Result<StatusResponse, Error> {
    let job = owned_job(state, tenant_id, job_id)?;

    let download_url = if job.status == JobStatus::Completed && job.output_path.is_some() {
        Some(format!("/download/{}.rm", job.job_id))
    } else {
        None
    };

    Ok(StatusResponse {
        job_id: job.job_id,
        status: job.status,
        progress: job.progress,
        created_at: job.created_at,
        started_at: job.started_at,
        completed_at: job.completed_at,
        download_url,
        error: job.error,
        stats: job.stats,
    })
}

/// Fetch the processed artifact for a completed job
pub fn download(
    state: &AppState,
    tenant_id: &str,
    job_id: Uuid,
) -> Result<DownloadPayload, Error> {
    let job = owned_job(state, tenant_id, job_id)?;

    if job.status != JobStatus::Completed {
        return Err(Error::Precondition(format!(
            "job is not completed (status: {})",
            job.status
        )));
    }

    let output_path = state
        .storage
        .find_file(tenant_id, job_id, FileRole::Output)
        .ok_or_else(|| Error::NotFound("output file".into()))?;

    let content = fs::read(&output_path).map_err(|source| Error::IoRead {
        path: output_path,
        source,
    })?;

    Ok(DownloadPayload {
        filename: job.input_filename,
        content,
    })
}

/// List a tenant's jobs, newest first
pub fn list_transforms(
    state: &AppState,
    tenant_id: &str,
    limit: i64,
) -> Result<HistoryResponse, Error> {
    if !(1..=1000).contains(&limit) {
        return Err(Error::Validation(format!(
            "limit must be between 1 and 1000, got {}",
            limit
        )));
    }

    let jobs = state.queue.list(tenant_id, limit as usize);
    let transforms: Vec<HistoryItem> = jobs
        .into_iter()
        .map(|job| HistoryItem {
            job_id: job.job_id,
            status: job.status,
            preset: job.preset,
            filename: job.input_filename,
            created_at: job.created_at,
            completed_at: job.completed_at,
        })
        .collect();

    let total = transforms.len();
    Ok(HistoryResponse { transforms, total })
}
