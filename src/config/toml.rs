//! TOML configuration file parsing

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::cli::Cli;
use super::{DaemonConfig, ServerConfig};

/// Well-known daemon config locations, probed in order
const DAEMON_CONFIG_PATHS: [&str; 2] = [
    "/home/root/.inksight/config.toml",
    "/etc/inksight/config.toml",
];

/// Well-known server config locations, probed in order
const SERVER_CONFIG_PATHS: [&str; 1] = ["/etc/inksight/server.toml"];

/// Parse a daemon configuration file
pub fn parse_daemon_file(path: &Path) -> Result<DaemonConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_daemon_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse daemon configuration from a string
pub fn parse_daemon_string(contents: &str) -> Result<DaemonConfig> {
    let config: DaemonConfig =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;
    Ok(config)
}

/// Parse a server configuration file
pub fn parse_server_file(path: &Path) -> Result<ServerConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: ServerConfig = ::toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load the daemon configuration, falling back to well-known paths and then
/// to defaults
///
/// An explicitly-passed path must exist and parse; probed paths are only used
/// when present.
pub fn load_daemon_config(explicit: Option<&Path>) -> Result<DaemonConfig> {
    if let Some(path) = explicit {
        return parse_daemon_file(path);
    }
    for candidate in DAEMON_CONFIG_PATHS {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            return parse_daemon_file(&path);
        }
    }
    Ok(DaemonConfig::default())
}

/// Load the server configuration, falling back to well-known paths and then
/// to defaults
pub fn load_server_config(explicit: Option<&Path>) -> Result<ServerConfig> {
    if let Some(path) = explicit {
        return parse_server_file(path);
    }
    for candidate in SERVER_CONFIG_PATHS {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            return parse_server_file(&path);
        }
    }
    Ok(ServerConfig::default())
}

/// Merge CLI arguments with the daemon configuration (CLI takes precedence)
pub fn merge_daemon_cli(cli: &Cli, mut config: DaemonConfig) -> DaemonConfig {
    if let Some(dir) = &cli.watch_dir {
        config.watch_dir = dir.clone();
    }
    if let Some(interval) = cli.poll_interval {
        config.poll_interval = interval;
    }
    if let Some(threshold) = cli.idle_threshold {
        config.idle_threshold = threshold;
    }
    config
}

/// Merge CLI arguments with the server configuration (CLI takes precedence)
pub fn merge_server_cli(cli: &Cli, mut config: ServerConfig) -> ServerConfig {
    if let Some(bind) = &cli.bind {
        config.bind_address = bind.clone();
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = dir.clone();
    }
    if let Some(keys) = &cli.api_keys {
        config.api_keys = keys.clone();
    }
    if let Some(size) = cli.max_file_size_mb {
        config.max_file_size_mb = size;
    }
    config
}
