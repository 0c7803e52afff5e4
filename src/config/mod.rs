//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and merging the
//! two (CLI takes precedence). Configuration that cannot be parsed at startup
//! is fatal.

pub mod cli;
pub mod toml;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::stroke::PipelineConfig;

/// On-device daemon configuration
///
/// The pipeline sections (`[smoothing]`, `[line_straightening]`,
/// `[pressure_normalization]`) are flattened into the top level of the TOML
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Notebook directory to watch
    #[serde(default = "default_watch_dir")]
    pub watch_dir: PathBuf,

    /// Seconds between directory scans
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,

    /// Seconds a file must stay unchanged before it counts as idle
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold: f64,

    /// Kernel parameters
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    /// Stroke eligibility and rewrite policy
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Cloud handoff queue
    #[serde(default)]
    pub cloud: CloudHandoffConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            watch_dir: default_watch_dir(),
            poll_interval: default_poll_interval(),
            idle_threshold: default_idle_threshold(),
            pipeline: PipelineConfig::default(),
            processing: ProcessingConfig::default(),
            cloud: CloudHandoffConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Stroke eligibility and rewrite policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Tool ids never processed (highlighter, eraser)
    #[serde(default = "default_skip_tools")]
    pub skip_tools: Vec<u32>,
    /// When non-empty, only these tool ids are processed
    #[serde(default)]
    pub only_tools: Vec<u32>,
    /// Keep the backup sibling written during atomic rewrites
    #[serde(default = "default_true")]
    pub keep_backups: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            skip_tools: default_skip_tools(),
            only_tools: Vec::new(),
            keep_backups: true,
        }
    }
}

/// Cloud handoff queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudHandoffConfig {
    /// Queue idle pages for cloud processing
    #[serde(default)]
    pub enabled: bool,
    /// Where the queue document lives
    #[serde(default = "default_queue_file")]
    pub queue_file: PathBuf,
}

impl Default for CloudHandoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_file: default_queue_file(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also append logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl DaemonConfig {
    /// Assemble the processor configuration from the pipeline and policy
    /// sections
    pub fn processor_config(&self) -> crate::processor::ProcessorConfig {
        crate::processor::ProcessorConfig {
            pipeline: self.pipeline.clone(),
            skip_tools: self.processing.skip_tools.clone(),
            only_tools: self.processing.only_tools.clone(),
            keep_backups: self.processing.keep_backups,
        }
    }
}

/// Cloud API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Comma-separated valid API keys; empty means development mode
    #[serde(default)]
    pub api_keys: String,

    /// Root directory for per-tenant storage
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Maximum accepted upload size
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Log level filter
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_keys: String::new(),
            storage_dir: default_storage_dir(),
            max_file_size_mb: default_max_file_size_mb(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Parse the configured API keys into a set
    pub fn valid_api_keys(&self) -> HashSet<String> {
        self.api_keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_watch_dir() -> PathBuf {
    PathBuf::from("/home/root/.local/share/remarkable/xochitl")
}

fn default_poll_interval() -> f64 {
    2.0
}

fn default_idle_threshold() -> f64 {
    30.0
}

fn default_skip_tools() -> Vec<u32> {
    crate::stroke::presets::DEFAULT_SKIP_TOOLS.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_queue_file() -> PathBuf {
    PathBuf::from("/home/root/.inksight/cloud_queue.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("/var/lib/inksight")
}

fn default_max_file_size_mb() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.poll_interval, 2.0);
        assert_eq!(config.idle_threshold, 30.0);
        assert_eq!(config.processing.skip_tools, vec![6, 8]);
        assert!(config.processing.keep_backups);
        assert!(!config.cloud.enabled);
    }

    #[test]
    fn test_processor_config_assembly() {
        let mut config = DaemonConfig::default();
        config.processing.only_tools = vec![2, 4];
        config.processing.keep_backups = false;
        let processor = config.processor_config();
        assert_eq!(processor.only_tools, vec![2, 4]);
        assert!(!processor.keep_backups);
    }

    #[test]
    fn test_api_key_parsing() {
        let config = ServerConfig {
            api_keys: "key_a, key_b,,key_c ".to_string(),
            ..Default::default()
        };
        let keys = config.valid_api_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains("key_a"));
        assert!(keys.contains("key_b"));
        assert!(keys.contains("key_c"));

        assert!(ServerConfig::default().valid_api_keys().is_empty());
    }
}
