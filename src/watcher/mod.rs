//! Directory watcher for the on-device daemon
//!
//! Polls the notebook tree instead of using inotify for maximum compatibility
//! across tablet firmware versions. Each file moves through a small idle
//! state machine: any observed mtime change restarts its debounce clock, and
//! only files that have sat still for the idle threshold are processed or
//! handed off to the cloud queue.

pub mod handoff;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::DaemonConfig;
use crate::processor::{file_mtime_nanos, FileProcessor};
use handoff::HandoffQueue;

/// Polling watcher over the notebook directory tree
pub struct FileWatcher {
    config: DaemonConfig,
    processor: FileProcessor,
    handoff: Option<HandoffQueue>,

    // Idle-detection state, owned by the watcher alone
    file_mtimes: HashMap<PathBuf, u128>,
    last_change: HashMap<PathBuf, Instant>,
    idle_dispatched: HashSet<PathBuf>,
}

impl FileWatcher {
    pub fn new(config: DaemonConfig) -> Self {
        let processor = FileProcessor::new(config.processor_config());
        let handoff = if config.cloud.enabled {
            Some(HandoffQueue::open(&config.cloud.queue_file))
        } else {
            None
        };

        Self {
            config,
            processor,
            handoff,
            file_mtimes: HashMap::new(),
            last_change: HashMap::new(),
            idle_dispatched: HashSet::new(),
        }
    }

    /// Scan the notebook tree once, processing any idle changed files
    ///
    /// Returns the number of files rewritten this cycle. Per-file errors are
    /// logged and never abort the scan.
    pub fn scan_once(&mut self) -> usize {
        let root = self.config.watch_dir.clone();
        if !root.is_dir() {
            warn!(dir = %root.display(), "watch directory not found");
            return 0;
        }

        let mut changed = 0;
        let now = Instant::now();

        for notebook_dir in subdirectories(&root) {
            for rm_path in scene_files(&notebook_dir) {
                if self.handle_file(&notebook_dir, &rm_path, now) {
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Track one file's mtime and dispatch it once idle
    fn handle_file(&mut self, notebook_dir: &Path, rm_path: &Path, now: Instant) -> bool {
        let mtime = match file_mtime_nanos(rm_path) {
            Ok(mtime) => mtime,
            Err(_) => return false,
        };

        // Any observed change restarts the debounce clock
        if self.file_mtimes.get(rm_path) != Some(&mtime) {
            self.file_mtimes.insert(rm_path.to_path_buf(), mtime);
            self.last_change.insert(rm_path.to_path_buf(), now);
            self.idle_dispatched.remove(rm_path);
        }

        let last_change = *self
            .last_change
            .entry(rm_path.to_path_buf())
            .or_insert(now);
        let idle = now.duration_since(last_change).as_secs_f64();
        if idle < self.config.idle_threshold {
            return false; // Still being edited
        }

        let mut file_changed = false;
        if self.processor.should_process(rm_path) {
            match self.processor.process_file(rm_path) {
                Ok(outcome) => file_changed = outcome.changed(),
                Err(e) => {
                    error!(path = %rm_path.display(), error = %e, "processing failed");
                }
            }
        }

        // Hand the idle page to the cloud queue exactly once per edit burst
        if let Some(queue) = self.handoff.as_mut() {
            if !self.idle_dispatched.contains(rm_path) {
                self.idle_dispatched.insert(rm_path.to_path_buf());
                let notebook_id = name_of(notebook_dir);
                let page_id = rm_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                queue.enqueue(&notebook_id, &page_id, rm_path);
            }
        }

        file_changed
    }

    /// Run the watcher loop until interrupted
    pub async fn run(&mut self) {
        info!(
            dir = %self.config.watch_dir.display(),
            poll_interval = self.config.poll_interval,
            idle_threshold = self.config.idle_threshold,
            "starting file watcher"
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("received interrupt, shutting down");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs_f64(self.config.poll_interval)) => {
                    let count = self.scan_once();
                    if count > 0 {
                        info!(count, "processed files this cycle");
                    }
                }
            }
        }
    }
}

fn subdirectories(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %root.display(), error = %e, "could not list watch directory");
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn scene_files(notebook_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(notebook_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "rm"))
        .collect();
    files.sort();
    files
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
