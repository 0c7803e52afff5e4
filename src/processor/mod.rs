//! File processing
//!
//! `transform_blocks` is the shared core used by both tiers: it walks the
//! line items of a decoded scene, runs eligible strokes through the pipeline,
//! and counts what each stage actually changed. `FileProcessor` wraps it for
//! the device tier with in-place atomic rewrites and processed-marker
//! sidecars so a file is never half-written and never processed twice.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::scene::{read_blocks, write_blocks, Block};
use crate::stroke::presets::DEFAULT_SKIP_TOOLS;
use crate::stroke::{process_stroke, PipelineConfig};

/// Marker sidecar suffix recording the last processed mtime
pub const PROCESSED_MARKER_SUFFIX: &str = ".inksight";

/// Temp file suffix used during atomic rewrite
pub const TMP_SUFFIX: &str = ".inksight_tmp";

/// Backup file suffix written before the rename
pub const BACKUP_SUFFIX: &str = ".inksight_bak";

/// Per-file processing counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Strokes the pipeline visibly changed
    pub strokes_processed: u32,
    /// Strokes the smoothing stage changed
    pub strokes_smoothed: u32,
    /// Strokes the straightening stage changed
    pub strokes_straightened: u32,
    /// Strokes skipped: ineligible tool, degenerate, or no visible change
    pub strokes_skipped: u32,
    /// Wall-clock processing time, set by the cloud worker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

/// Stroke eligibility and rewrite policy around the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Kernel parameters
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Tool ids never processed (highlighter, eraser)
    #[serde(default = "default_skip_tools")]
    pub skip_tools: Vec<u32>,
    /// When non-empty, only these tool ids are processed
    #[serde(default)]
    pub only_tools: Vec<u32>,
    /// Keep the .inksight_bak sibling after a successful rewrite
    #[serde(default = "default_true")]
    pub keep_backups: bool,
}

fn default_skip_tools() -> Vec<u32> {
    DEFAULT_SKIP_TOOLS.to_vec()
}

fn default_true() -> bool {
    true
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            skip_tools: default_skip_tools(),
            only_tools: Vec::new(),
            keep_backups: true,
        }
    }
}

impl ProcessorConfig {
    /// Tool eligibility: skip-set wins, then the optional include-set
    fn tool_eligible(&self, tool: u32) -> bool {
        if self.skip_tools.contains(&tool) {
            return false;
        }
        if !self.only_tools.is_empty() && !self.only_tools.contains(&tool) {
            return false;
        }
        true
    }
}

/// Result of processing one file
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// At least one stroke changed and the file was rewritten
    Changed(ProcessingStats),
    /// Nothing changed; the file was left untouched
    Unchanged(ProcessingStats),
}

impl ProcessOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ProcessOutcome::Changed(_))
    }

    pub fn stats(&self) -> &ProcessingStats {
        match self {
            ProcessOutcome::Changed(stats) | ProcessOutcome::Unchanged(stats) => stats,
        }
    }
}

/// Run every eligible stroke through the pipeline, replacing changed ones
///
/// Returns per-stage counters; the caller decides whether to persist.
pub fn transform_blocks(blocks: &mut [Block], config: &ProcessorConfig) -> ProcessingStats {
    let mut stats = ProcessingStats::default();

    for block in blocks.iter_mut() {
        let item = match block.as_line_item_mut() {
            Some(item) => item,
            None => continue,
        };
        let line = match item.line.as_mut() {
            Some(line) => line,
            None => continue,
        };

        if !config.tool_eligible(line.tool) {
            stats.strokes_skipped += 1;
            continue;
        }
        if line.points.len() < 2 {
            stats.strokes_skipped += 1;
            continue;
        }

        let outcome = process_stroke(&line.points, &config.pipeline);
        if outcome.changed() {
            line.points = outcome.points;
            stats.strokes_processed += 1;
            if outcome.smoothed {
                stats.strokes_smoothed += 1;
            }
            if outcome.straightened {
                stats.strokes_straightened += 1;
            }
        } else {
            stats.strokes_skipped += 1;
        }
    }

    stats
}

/// Device-tier file processor: reads, transforms, and atomically rewrites
/// scene files, tracking what has already been handled
pub struct FileProcessor {
    config: ProcessorConfig,
    processed_mtimes: HashMap<PathBuf, u128>,
}

impl FileProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            processed_mtimes: HashMap::new(),
        }
    }

    /// Check whether a scene file needs processing
    ///
    /// True only for `.rm` paths with a readable mtime that differs from both
    /// the in-memory record and the marker sidecar.
    pub fn should_process(&mut self, path: &Path) -> bool {
        if path.extension().and_then(OsStr::to_str) != Some("rm") {
            return false;
        }

        let mtime = match file_mtime_nanos(path) {
            Ok(mtime) => mtime,
            Err(_) => return false,
        };

        if self.processed_mtimes.get(path) == Some(&mtime) {
            return false;
        }

        let marker = sibling_path(path, PROCESSED_MARKER_SUFFIX);
        if let Ok(content) = fs::read_to_string(&marker) {
            if content.trim() == mtime.to_string() {
                self.processed_mtimes.insert(path.to_path_buf(), mtime);
                return false;
            }
        }

        true
    }

    /// Process one scene file in place
    pub fn process_file(&mut self, path: &Path) -> Result<ProcessOutcome, Error> {
        info!(path = %path.display(), "processing");

        let data = fs::read(path).map_err(|source| Error::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut blocks = read_blocks(&data)?;

        let stats = transform_blocks(&mut blocks, &self.config);

        if stats.strokes_processed > 0 {
            self.write_safely(path, &blocks)?;
            info!(
                path = %path.display(),
                processed = stats.strokes_processed,
                smoothed = stats.strokes_smoothed,
                straightened = stats.strokes_straightened,
                skipped = stats.strokes_skipped,
                "rewrote scene file"
            );
        } else {
            debug!(path = %path.display(), skipped = stats.strokes_skipped, "no changes needed");
        }

        self.mark_processed(path);

        if stats.strokes_processed > 0 {
            Ok(ProcessOutcome::Changed(stats))
        } else {
            Ok(ProcessOutcome::Unchanged(stats))
        }
    }

    /// Atomic rewrite: temp sibling, backup copy, rename over the original
    ///
    /// The temp file is removed on any failure so a crash never leaves a
    /// half-written scene in place.
    fn write_safely(&self, path: &Path, blocks: &[Block]) -> Result<(), Error> {
        let tmp = sibling_path(path, TMP_SUFFIX);
        let backup = sibling_path(path, BACKUP_SUFFIX);

        let bytes = write_blocks(blocks)?;
        let replaced = fs::write(&tmp, &bytes)
            .and_then(|_| fs::copy(path, &backup).map(|_| ()))
            .and_then(|_| fs::rename(&tmp, path));
        if let Err(source) = replaced {
            let _ = fs::remove_file(&tmp);
            return Err(Error::IoWrite {
                path: path.to_path_buf(),
                source,
            });
        }

        if !self.config.keep_backups {
            let _ = fs::remove_file(&backup);
        }

        Ok(())
    }

    /// Record the post-write mtime in memory and in the marker sidecar
    fn mark_processed(&mut self, path: &Path) {
        let mtime = match file_mtime_nanos(path) {
            Ok(mtime) => mtime,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not stat processed file");
                return;
            }
        };

        self.processed_mtimes.insert(path.to_path_buf(), mtime);

        let marker = sibling_path(path, PROCESSED_MARKER_SUFFIX);
        if let Err(e) = fs::write(&marker, mtime.to_string()) {
            warn!(marker = %marker.display(), error = %e, "could not write marker");
        }
    }
}

/// File mtime as integer nanoseconds since the Unix epoch
pub(crate) fn file_mtime_nanos(path: &Path) -> std::io::Result<u128> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0))
}

/// `path` with `suffix` appended to the full file name
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
