//! Job records for async processing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::processor::ProcessingStats;

/// Status of a processing job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One file processing job
///
/// Invariants: `created_at <= started_at <= completed_at`; `Completed`
/// implies an output path, progress 100, and no error; `Failed` implies an
/// error; progress never decreases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    /// Opaque tenant identity; jobs are only visible to their tenant
    pub tenant_id: String,
    pub status: JobStatus,
    pub preset: String,

    // File references
    pub input_filename: String,
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    // Processing info
    /// Progress in [0, 100], monotonically non-decreasing
    pub progress: i32,
    pub error: Option<String>,
    pub stats: Option<ProcessingStats>,
}

impl Job {
    /// Create a fresh queued job
    pub fn new(tenant_id: &str, preset: &str, input_filename: &str, input_path: PathBuf) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            status: JobStatus::Queued,
            preset: preset.to_string(),
            input_filename: input_filename.to_string(),
            input_path,
            output_path: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: 0,
            error: None,
            stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new("tenant", "medium", "doc.rm", PathBuf::from("/tmp/doc.rm"));
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.started_at.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Queued).unwrap(),
            "\"queued\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = Job::new("t", "medium", "a.rm", PathBuf::from("/tmp/a.rm"));
        let b = Job::new("t", "medium", "b.rm", PathBuf::from("/tmp/b.rm"));
        assert_ne!(a.job_id, b.job_id);
    }
}
