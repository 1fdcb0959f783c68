//! Wiring the core services from loaded configuration

use std::sync::Arc;
use std::time::Duration;

use planner_sync_common::resilience::BackoffRetrier;
use planner_sync_core::{
    CalendarEventRepository, PlannerClient, ResourceReconciler, ResourceRepository,
    ServiceCallLogRepository, SyncLogRepository, SyncService,
};
use planner_sync_domain::{Config, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::backoff_config;

/// Storage and Planner adapters the core services run against
#[derive(Clone)]
pub struct SyncPorts {
    pub events: Arc<dyn CalendarEventRepository>,
    pub sync_logs: Arc<dyn SyncLogRepository>,
    pub calls: Arc<dyn ServiceCallLogRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub client: Arc<dyn PlannerClient>,
}

/// Build both core services from `config`.
///
/// `config` is validated first, so a zero timeout or create cap is refused.
/// The `[retry]` section drives both retriers, `[sync]` sets the create cap
/// and `planner.timeout_seconds` bounds every Planner call. Retriers are bound
/// to child tokens of `shutdown`, so pass the worker's token here.
pub fn build_services(
    config: &Config,
    ports: SyncPorts,
    shutdown: &CancellationToken,
) -> Result<(Arc<SyncService>, Arc<ResourceReconciler>)> {
    let backoff = backoff_config(&config.retry)?;
    config.validate()?;
    let call_timeout = Duration::from_secs(config.planner.timeout_seconds);

    let sync = SyncService::new(
        ports.events,
        ports.sync_logs,
        ports.calls,
        Arc::clone(&ports.client),
        BackoffRetrier::new(backoff.clone(), shutdown.child_token()),
    )
    .with_sync_config(&config.sync)
    .with_call_timeout(call_timeout);

    let reconciler = ResourceReconciler::new(
        ports.client,
        ports.resources,
        BackoffRetrier::new(backoff, shutdown.child_token()),
    )
    .with_call_timeout(call_timeout);

    debug!(
        max_create_batch_size = config.sync.max_create_batch_size,
        call_timeout_secs = call_timeout.as_secs(),
        "Core services assembled"
    );

    Ok((Arc::new(sync), Arc::new(reconciler)))
}
