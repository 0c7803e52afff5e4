//! InkSight CLI entry point

use anyhow::{Context, Result};
use inksight::config::cli::{Cli, ExecutionMode};
use inksight::config::toml::{
    load_daemon_config, load_server_config, merge_daemon_cli, merge_server_cli,
};
use inksight::watcher::FileWatcher;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    println!("InkSight v{}", env!("CARGO_PKG_VERSION"));

    match cli.mode {
        ExecutionMode::Daemon => run_daemon(cli),
        ExecutionMode::Serve => run_serve(cli),
    }
}

/// Run the on-device daemon (or a single scan with --scan-once)
fn run_daemon(cli: Cli) -> Result<()> {
    // Unparseable configuration is fatal before any work starts
    let config = load_daemon_config(cli.config.as_deref())?;
    let config = merge_daemon_cli(&cli, config);

    init_logging(&config.logging.level, config.logging.file.as_deref())?;
    info!(
        watch_dir = %config.watch_dir.display(),
        poll_interval = config.poll_interval,
        idle_threshold = config.idle_threshold,
        "daemon starting"
    );

    let mut watcher = FileWatcher::new(config);

    if cli.scan_once {
        let count = watcher.scan_once();
        println!("Scan complete: {} files processed", count);
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(watcher.run());
    Ok(())
}

/// Run the cloud API server
fn run_serve(cli: Cli) -> Result<()> {
    let config = load_server_config(cli.config.as_deref())?;
    let config = merge_server_cli(&cli, config);

    init_logging(&config.log_level, None)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(inksight::cloud::server::run(config))
}

/// Install the tracing subscriber, optionally teeing to a log file
///
/// `RUST_LOG` overrides the configured level when set.
fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let name = path.file_name().unwrap_or_else(|| OsStr::new("inksight.log"));
            let appender = tracing_appender::rolling::never(dir, name);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stdout.and(appender))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
