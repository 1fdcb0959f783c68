//! Periodic sync worker
//!
//! Every tick walks the configured departments in order: resources are
//! reconciled first (when enabled), then one sync cycle runs. A department
//! failing does not stop the others; shutdown does.
//!
//! The worker owns the shutdown token. Build the retriers handed to the core
//! services from `worker.shutdown_token().child_token()` so that [`stop`]
//! also cuts short any backoff wait in flight.
//!
//! [`stop`]: SyncWorker::stop

use std::sync::Arc;
use std::time::{Duration, Instant};

use planner_sync_core::{ReconciliationReport, ResourceReconciler, SyncCycleReport, SyncService};
use planner_sync_domain::{PlannerSyncError, SyncConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::errors::WorkerError;

/// Configuration for the sync worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWorkerConfig {
    /// Departments processed on every tick, in order
    pub departments: Vec<String>,
    /// Interval between ticks
    pub poll_interval: Duration,
    /// Timeout for a whole tick
    pub processing_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
    /// Run resource reconciliation before each department's cycle
    pub reconcile_resources: bool,
    pub enabled: bool,
}

impl Default for SyncWorkerConfig {
    fn default() -> Self {
        Self::from_sync_config(&SyncConfig::default())
    }
}

impl SyncWorkerConfig {
    pub fn from_sync_config(sync: &SyncConfig) -> Self {
        let poll_interval = Duration::from_secs(sync.interval_seconds.max(1));
        Self {
            departments: sync.departments.clone(),
            poll_interval,
            processing_timeout: poll_interval.saturating_mul(5),
            join_timeout: Duration::from_secs(5),
            reconcile_resources: true,
            enabled: sync.enabled,
        }
    }
}

/// What one tick did across all departments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub cycles: Vec<SyncCycleReport>,
    pub reconciliations: Vec<ReconciliationReport>,
    /// Department and error of every failed step
    pub failures: Vec<(String, PlannerSyncError)>,
    /// Shutdown was requested before every department was processed
    pub interrupted: bool,
}

impl TickSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }
}

struct WorkerState {
    sync: Arc<SyncService>,
    reconciler: Arc<ResourceReconciler>,
    departments: Vec<String>,
    reconcile_resources: bool,
}

/// Sync worker with explicit lifecycle management.
pub struct SyncWorker {
    state: Arc<WorkerState>,
    config: SyncWorkerConfig,
    shutdown: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Create a new sync worker with the given configuration.
    pub fn new(
        sync: Arc<SyncService>,
        reconciler: Arc<ResourceReconciler>,
        config: SyncWorkerConfig,
    ) -> Self {
        let state = WorkerState {
            sync,
            reconciler,
            departments: config.departments.clone(),
            reconcile_resources: config.reconcile_resources,
        };
        Self { state: Arc::new(state), config, shutdown: CancellationToken::new(), task_handle: None }
    }

    /// Use an externally owned shutdown token, e.g. the parent of the
    /// retriers' tokens.
    pub fn with_shutdown_token(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn config(&self) -> &SyncWorkerConfig {
        &self.config
    }

    /// Start the worker, spawning the background processing task.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning);
        }
        if self.shutdown.is_cancelled() {
            return Err(WorkerError::ShutDown);
        }
        if !self.config.enabled {
            info!("Sync disabled; worker not started");
            return Err(WorkerError::Disabled);
        }

        info!(departments = self.state.departments.len(), "Starting sync worker");

        let state = Arc::clone(&self.state);
        let poll_interval = self.config.poll_interval;
        let processing_timeout = self.config.processing_timeout;
        let cancel = self.shutdown.clone();

        let handle = tokio::spawn(async move {
            Self::process_loop(state, poll_interval, processing_timeout, cancel).await;
        });

        self.task_handle = Some(handle);
        info!("Sync worker started");
        Ok(())
    }

    /// Cancel the shutdown token and wait for the processing task to finish.
    ///
    /// Retriers built from child tokens abort their waits; the worker cannot
    /// be started again afterwards.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), WorkerError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(WorkerError::NotRunning);
        };

        info!("Stopping sync worker");
        self.shutdown.cancel();

        let join_timeout = self.config.join_timeout;
        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Worker task panicked: {}", e);
                return Err(WorkerError::TaskPanicked(e.to_string()));
            }
            Err(_) => {
                warn!("Worker task did not complete within timeout");
                return Err(WorkerError::JoinTimeout(join_timeout));
            }
        }

        info!("Sync worker stopped");
        Ok(())
    }

    /// Returns true when a worker instance is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Run a single tick on the caller's task.
    pub async fn run_once(&self) -> TickSummary {
        Self::tick(&self.state, &self.shutdown).await
    }

    async fn process_loop(
        state: Arc<WorkerState>,
        poll_interval: Duration,
        processing_timeout: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Sync worker process loop cancelled");
                    break;
                }
                () = tokio::time::sleep(poll_interval) => {
                    let started = Instant::now();

                    match tokio::time::timeout(processing_timeout, Self::tick(&state, &cancel)).await {
                        Ok(summary) if summary.is_clean() => {
                            debug!(
                                cycles = summary.cycles.len(),
                                elapsed_ms = started.elapsed().as_millis(),
                                "Sync tick completed"
                            );
                        }
                        Ok(summary) => {
                            for (department, err) in &summary.failures {
                                error!(department = %department, error = %err, "Sync tick step failed");
                            }
                            if summary.interrupted {
                                debug!("Sync tick interrupted by shutdown");
                            }
                        }
                        Err(_) => {
                            warn!(timeout_secs = processing_timeout.as_secs(), "Sync tick timed out");
                        }
                    }
                }
            }
        }
    }

    async fn tick(state: &WorkerState, cancel: &CancellationToken) -> TickSummary {
        let mut summary = TickSummary::default();

        for department in &state.departments {
            if cancel.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            if state.reconcile_resources {
                match state.reconciler.reconcile_department(department).await {
                    Ok(report) => summary.reconciliations.push(report),
                    Err(err) if err.is_shutdown() => {
                        summary.interrupted = true;
                        break;
                    }
                    Err(err) => {
                        warn!(department = %department, error = %err, "Resource reconciliation failed");
                        summary.failures.push((department.clone(), err));
                    }
                }
            }

            match state.sync.run_cycle(department).await {
                Ok(report) => summary.cycles.push(report),
                Err(err) if err.is_shutdown() => {
                    summary.interrupted = true;
                    break;
                }
                Err(err) => {
                    warn!(department = %department, error = %err, "Sync cycle failed");
                    summary.failures.push((department.clone(), err));
                }
            }
        }

        summary
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncWorker dropped while running; cancelling tasks");
            self.shutdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_sync_config() {
        let sync = SyncConfig {
            departments: vec!["north".into(), "south".into()],
            interval_seconds: 30,
            max_create_batch_size: 10,
            enabled: false,
        };

        let config = SyncWorkerConfig::from_sync_config(&sync);

        assert_eq!(config.departments, sync.departments);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.processing_timeout, Duration::from_secs(150));
        assert!(config.reconcile_resources);
        assert!(!config.enabled);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let sync = SyncConfig { interval_seconds: 0, ..SyncConfig::default() };
        assert_eq!(SyncWorkerConfig::from_sync_config(&sync).poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_tick_summary_cleanliness() {
        let mut summary = TickSummary::default();
        assert!(summary.is_clean());

        summary.failures.push(("north".into(), PlannerSyncError::Network("down".into())));
        assert!(!summary.is_clean());

        let interrupted = TickSummary { interrupted: true, ..TickSummary::default() };
        assert!(!interrupted.is_clean());
    }
}
