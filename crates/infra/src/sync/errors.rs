//! Sync worker error types

use std::time::Duration;

use thiserror::Error;

/// Lifecycle errors of the [`SyncWorker`](super::SyncWorker)
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker already running")]
    AlreadyRunning,

    #[error("Worker not running")]
    NotRunning,

    /// The shutdown token was cancelled; a stopped worker cannot be restarted.
    #[error("Worker has been shut down")]
    ShutDown,

    #[error("Sync is disabled in configuration")]
    Disabled,

    #[error("Worker task panicked: {0}")]
    TaskPanicked(String),

    #[error("Worker task did not finish within {0:?}")]
    JoinTimeout(Duration),
}
