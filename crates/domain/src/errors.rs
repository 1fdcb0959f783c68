//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for planner sync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PlannerSyncError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A caller handed the engine data that breaks its input contract, e.g. a
    /// completed sync attempt without a completion timestamp.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Work stopped because the process is shutting down.
    #[error("Aborted due to shutdown: {0}")]
    Shutdown(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlannerSyncError {
    /// True when the error signals a graceful stop rather than a failure.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown(_))
    }
}

/// Result type alias for planner sync operations
pub type Result<T> = std::result::Result<T, PlannerSyncError>;
