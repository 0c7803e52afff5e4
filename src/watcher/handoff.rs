//! Persisted cloud handoff queue
//!
//! A JSON-array document listing pages ready for cloud processing. The
//! watcher is the only writer; external consumers read it with last-write-wins
//! semantics. A missing or corrupt file loads as an empty queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lifecycle of a handoff entry
///
/// Entries are only ever appended as `Pending`; consumers outside this
/// process own the later transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffStatus {
    Pending,
}

/// One page queued for cloud processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffEntry {
    /// Notebook directory name
    pub notebook_id: String,
    /// Page file stem
    pub page_id: String,
    /// Full path of the scene file
    pub rm_path: PathBuf,
    /// When the entry was queued
    pub queued_at: DateTime<Utc>,
    pub status: HandoffStatus,
}

/// File-backed queue of pages awaiting cloud processing
pub struct HandoffQueue {
    queue_file: PathBuf,
    entries: Vec<HandoffEntry>,
}

impl HandoffQueue {
    /// Open the queue, loading any existing entries
    pub fn open(queue_file: impl Into<PathBuf>) -> Self {
        let queue_file = queue_file.into();
        let entries = match fs::read_to_string(&queue_file) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(file = %queue_file.display(), error = %e, "corrupt handoff queue, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            queue_file,
            entries,
        }
    }

    /// Append a page, suppressing duplicates that are still pending
    pub fn enqueue(&mut self, notebook_id: &str, page_id: &str, rm_path: &Path) {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.rm_path == rm_path && e.status == HandoffStatus::Pending);
        if duplicate {
            return;
        }

        self.entries.push(HandoffEntry {
            notebook_id: notebook_id.to_string(),
            page_id: page_id.to_string(),
            rm_path: rm_path.to_path_buf(),
            queued_at: Utc::now(),
            status: HandoffStatus::Pending,
        });
        self.save();
        info!(path = %rm_path.display(), "queued for cloud processing");
    }

    /// Current entries, oldest first
    pub fn entries(&self) -> &[HandoffEntry] {
        &self.entries
    }

    fn save(&self) {
        if let Some(parent) = self.queue_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), error = %e, "could not create queue directory");
                return;
            }
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.queue_file, json) {
                    warn!(file = %self.queue_file.display(), error = %e, "could not persist handoff queue");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize handoff queue"),
        }
    }
}
