//! Cloud API server lifecycle
//!
//! Builds the shared state, wires the routes, and serves until interrupted.
//! Shutdown is graceful: the listener stops first, then the queue refuses new
//! jobs and the worker finishes what it already owns.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;

use super::handlers::AppState;
use super::queue::JobQueue;
use super::routes;
use super::storage::Storage;

/// Run the cloud API until interrupted
pub async fn run(config: ServerConfig) -> Result<()> {
    let storage = Arc::new(Storage::open(&config.storage_dir)?);
    let queue = JobQueue::new(Arc::clone(&storage));

    let valid_keys = config.valid_api_keys();
    if valid_keys.is_empty() {
        warn!("no API keys configured - running in development mode");
    } else {
        info!(count = valid_keys.len(), "loaded API keys");
    }

    // Leave headroom above the upload limit for multipart framing
    let body_limit = (config.max_file_size_mb as usize + 1) * 1024 * 1024;

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?;

    let state = AppState {
        config: Arc::new(config),
        queue: queue.clone(),
        storage,
    };

    let app = routes::routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "cloud API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received interrupt, shutting down");
        })
        .await
        .context("server error")?;

    // Let the active job finish before the process exits
    queue.shutdown().await;
    info!("cloud API stopped");

    Ok(())
}
