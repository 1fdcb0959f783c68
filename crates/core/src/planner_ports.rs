//! Planner client port
//!
//! Transport (SOAP/HTTP) lives in an adapter outside this crate. Adapters
//! report overload with [`PlannerError::Busy`] so calls can be retried with
//! backoff; everything else is surfaced as-is.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use planner_sync_common::resilience::{BusySignal, RetryError};
use planner_sync_domain::{ExternalResource, PlannerSyncError, RemoteItemResult, SyncAttempt};
use thiserror::Error;

/// Failure of a single Planner call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Planner is overloaded; the same call may succeed shortly.
    #[error("Planner is busy: {0}")]
    Busy(String),

    #[error("Planner transport error: {0}")]
    Transport(String),

    /// Planner refused the whole call (malformed request, authorization).
    #[error("Planner rejected the call: {0}")]
    Rejected(String),

    #[error("Planner call timed out after {0:?}")]
    Timeout(Duration),
}

impl BusySignal for PlannerError {
    fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl From<PlannerError> for PlannerSyncError {
    fn from(err: PlannerError) -> Self {
        PlannerSyncError::Network(err.to_string())
    }
}

/// Map a failed retried call into the domain error.
///
/// Shutdown keeps its own variant so callers can stop instead of counting it
/// as a remote failure.
pub fn retry_error_to_domain(label: &str, err: RetryError<PlannerError>) -> PlannerSyncError {
    match err {
        RetryError::ShutdownAborted { attempts } => {
            PlannerSyncError::Shutdown(format!("{label} aborted after {attempts} attempts"))
        }
        RetryError::BusyExhausted { attempts, source } => {
            PlannerSyncError::Network(format!("{label} still busy after {attempts} attempts: {source}"))
        }
        RetryError::Operation { source } => source.into(),
        RetryError::InvalidConfiguration { message } => PlannerSyncError::Config(message),
    }
}

/// Bound one Planner call by `limit`, answering [`PlannerError::Timeout`]
/// when it runs over.
pub async fn with_call_timeout<T, F>(limit: Duration, call: F) -> Result<T, PlannerError>
where
    F: Future<Output = Result<T, PlannerError>>,
{
    tokio::time::timeout(limit, call).await.unwrap_or(Err(PlannerError::Timeout(limit)))
}

/// Outbound operations against Planner
///
/// Event calls receive the attempts of one batch group plus the correlation
/// id recorded on the service call log, and answer one result per attempt.
#[async_trait]
pub trait PlannerClient: Send + Sync {
    async fn create_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError>;

    async fn update_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError>;

    async fn delete_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError>;

    /// Authoritative resource list for a department.
    async fn get_resources(&self, department: &str) -> Result<Vec<ExternalResource>, PlannerError>;
}
