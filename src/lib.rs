//! InkSight - Handwriting improvement for reMarkable ink
//!
//! InkSight cleans up handwritten strokes in reMarkable .rm (v6) scene files.
//! One stroke pipeline backs two delivery modes: an on-device daemon that
//! rewrites idle files in place, and a multi-tenant cloud API.
//!
//! # Architecture
//!
//! - **Stroke kernels**: Gaussian/moving-average smoothing, RDP simplification,
//!   straight-line snapping, percentile pressure normalization
//! - **Scene codec**: tagged binary blocks; line items interpreted, everything
//!   else passed through untouched
//! - **Device daemon**: polls the notebook tree, debounces edits, rewrites
//!   files with atomic temp+rename and a processed-marker sidecar
//! - **Cloud API**: upload/status/download/history with an in-process job
//!   queue and a single background worker

pub mod cloud;
pub mod config;
pub mod error;
pub mod processor;
pub mod scene;
pub mod stroke;
pub mod watcher;

// Re-export commonly used types
pub use error::Error;
pub use stroke::{Point, Stroke};

/// Result type used throughout InkSight
pub type Result<T> = anyhow::Result<T>;
