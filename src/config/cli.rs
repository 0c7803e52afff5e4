//! CLI argument parsing using clap

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// On-device daemon - watch the notebook directory and rewrite idle files
    Daemon,
    /// Cloud API - accept uploads, process asynchronously, serve results
    Serve,
}

/// InkSight - Handwriting improvement for reMarkable ink
#[derive(Parser, Debug)]
#[command(name = "inksight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: daemon (on-device) or serve (cloud API)
    #[arg(long, value_enum, default_value = "daemon")]
    pub mode: ExecutionMode,

    /// Path to config file
    #[arg(short = 'c', long, env = "INKSIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    // === Daemon Options ===
    /// Override the watched notebook directory
    #[arg(long)]
    pub watch_dir: Option<PathBuf>,

    /// Scan once and exit (useful for testing)
    #[arg(long)]
    pub scan_once: bool,

    /// Override the poll interval in seconds
    #[arg(long)]
    pub poll_interval: Option<f64>,

    /// Override the idle threshold in seconds
    #[arg(long)]
    pub idle_threshold: Option<f64>,

    // === Serve Options ===
    /// Bind address for the cloud API (e.g., 0.0.0.0:8000)
    #[arg(long, env = "INKSIGHT_BIND")]
    pub bind: Option<String>,

    /// Root directory for per-tenant storage
    #[arg(long, env = "INKSIGHT_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Comma-separated valid API keys (empty enables development mode)
    #[arg(long, env = "INKSIGHT_API_KEYS")]
    pub api_keys: Option<String>,

    /// Maximum accepted upload size in MB
    #[arg(long)]
    pub max_file_size_mb: Option<u64>,
}

impl Cli {
    /// Parse arguments from the process environment
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations before any work starts
    pub fn validate(&self) -> Result<()> {
        if let Some(interval) = self.poll_interval {
            if interval <= 0.0 {
                bail!("--poll-interval must be positive, got {}", interval);
            }
        }
        if let Some(threshold) = self.idle_threshold {
            if threshold < 0.0 {
                bail!("--idle-threshold must not be negative, got {}", threshold);
            }
        }
        if let Some(bind) = &self.bind {
            if bind.parse::<SocketAddr>().is_err() {
                bail!("--bind must be a socket address like 0.0.0.0:8000, got '{}'", bind);
            }
        }
        if let Some(size) = self.max_file_size_mb {
            if size == 0 {
                bail!("--max-file-size-mb must be positive");
            }
        }
        if self.scan_once && self.mode != ExecutionMode::Daemon {
            bail!("--scan-once only applies to daemon mode");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("inksight").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_mode_is_daemon() {
        let cli = parse(&[]);
        assert_eq!(cli.mode, ExecutionMode::Daemon);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_serve_mode_with_overrides() {
        let cli = parse(&[
            "--mode",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--max-file-size-mb",
            "10",
        ]);
        assert_eq!(cli.mode, ExecutionMode::Serve);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let cli = parse(&["--mode", "serve", "--bind", "not-an-address"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_negative_poll_interval_rejected() {
        let cli = parse(&["--poll-interval=-1.0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_scan_once_requires_daemon_mode() {
        let cli = parse(&["--mode", "serve", "--scan-once"]);
        assert!(cli.validate().is_err());
    }
}
