//! Cloud tier
//!
//! Multi-tenant transform API: uploads land in tenant-scoped storage, jobs
//! run FIFO on a single background worker, and results are fetched by job id.
//! The request surface is a set of typed handlers with a thin axum shell.

pub mod auth;
pub mod handlers;
pub mod job;
pub mod processor;
pub mod queue;
pub mod routes;
pub mod server;
pub mod storage;

pub use handlers::AppState;
pub use job::{Job, JobStatus};
pub use queue::JobQueue;
pub use storage::Storage;
