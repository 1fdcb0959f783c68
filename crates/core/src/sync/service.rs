//! Sync cycle service - core business logic
//!
//! One cycle per department: pending attempts are batched, each group is sent
//! to Planner through the busy-aware retrier, outcomes are recorded and
//! classified, and transient failures are queued again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use planner_sync_common::resilience::BackoffRetrier;
use planner_sync_common::time::{Clock, SystemClock};
use planner_sync_domain::constants::{DEFAULT_MAX_CREATE_BATCH_SIZE, DEFAULT_PLANNER_TIMEOUT_SECS};
use planner_sync_domain::{
    CalendarEvent, CalendarWindow, PlannerSyncError, RemoteItemResult, Result,
    ServiceCallReferenceLog, SyncAttempt, SyncCompletion, SyncConfig, SyncOperation,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::ports::{CalendarEventRepository, ServiceCallLogRepository, SyncLogRepository};
use crate::batch::{build_batch, SyncLogBatch};
use crate::classification::{classify, AttemptOutcome};
use crate::event_status::{latest_attempt, sync_status, EventSyncStatus};
use crate::planner_ports::{retry_error_to_domain, with_call_timeout, PlannerClient};

/// A batch group whose Planner call failed as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub operation: SyncOperation,
    pub attempts: usize,
    pub error: PlannerSyncError,
}

/// What a sync cycle did for one department
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCycleReport {
    pub department: String,
    /// Attempts in groups Planner answered.
    pub sent: usize,
    /// Includes creates answered with "already exists".
    pub succeeded: usize,
    /// Transient failures queued again as new attempts.
    pub resent: usize,
    pub fatal: usize,
    pub planner_originated: usize,
    /// Older updates closed with the outcome of the update that replaced them.
    pub superseded: usize,
    /// Creates left in the queue because of the per-cycle cap.
    pub deferred_creates: usize,
    /// Sent attempts Planner did not answer for; they stay pending.
    pub unanswered: usize,
    /// Events whose update hit an item Planner no longer has.
    pub not_in_remote: Vec<Uuid>,
    /// Attempts that failed with a code outside the known taxonomy.
    pub unclassified: Vec<Uuid>,
    pub failed_groups: Vec<GroupFailure>,
}

impl SyncCycleReport {
    fn new(department: &str) -> Self {
        Self { department: department.to_string(), ..Self::default() }
    }
}

/// Calendar to Planner sync service
pub struct SyncService {
    events: Arc<dyn CalendarEventRepository>,
    sync_logs: Arc<dyn SyncLogRepository>,
    calls: Arc<dyn ServiceCallLogRepository>,
    client: Arc<dyn PlannerClient>,
    retrier: BackoffRetrier,
    clock: Arc<dyn Clock>,
    max_create_batch_size: usize,
    call_timeout: Duration,
}

impl SyncService {
    pub fn new(
        events: Arc<dyn CalendarEventRepository>,
        sync_logs: Arc<dyn SyncLogRepository>,
        calls: Arc<dyn ServiceCallLogRepository>,
        client: Arc<dyn PlannerClient>,
        retrier: BackoffRetrier,
    ) -> Self {
        Self {
            events,
            sync_logs,
            calls,
            client,
            retrier,
            clock: Arc::new(SystemClock),
            max_create_batch_size: DEFAULT_MAX_CREATE_BATCH_SIZE,
            call_timeout: Duration::from_secs(DEFAULT_PLANNER_TIMEOUT_SECS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cap on creates sent per cycle
    pub fn with_max_create_batch_size(mut self, size: usize) -> Self {
        self.max_create_batch_size = size;
        self
    }

    /// Apply the cycle settings from the `[sync]` config section.
    pub fn with_sync_config(self, config: &SyncConfig) -> Self {
        self.with_max_create_batch_size(config.max_create_batch_size)
    }

    /// Upper bound for a single Planner call. Each retry gets the full bound.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Run one sync cycle for `department`.
    ///
    /// A failed group is recorded in the report and the remaining groups are
    /// still sent. Shutdown stops the cycle and is returned as
    /// [`PlannerSyncError::Shutdown`].
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, department: &str) -> Result<SyncCycleReport> {
        let pending = self.sync_logs.pending_sync_logs(department).await?;
        let batch = build_batch(&pending, self.max_create_batch_size);
        let mut report = SyncCycleReport::new(department);

        let pending_creates =
            pending.iter().filter(|a| a.is_pending() && a.operation == SyncOperation::Create).count();
        report.deferred_creates = pending_creates.saturating_sub(batch.creates.len());

        if batch.is_empty() {
            debug!(department, "No pending sync logs");
            return Ok(report);
        }

        let mut completions: HashMap<Uuid, SyncCompletion> = HashMap::new();
        for (operation, group) in batch.groups() {
            match self.send_group(operation, group).await {
                Ok((call_id, results)) => {
                    report.sent += group.len();
                    self.record_outcomes(call_id, group, &results, &mut completions, &mut report)
                        .await;
                    // Must happen before the delete group, which may return
                    // early on shutdown.
                    if operation == SyncOperation::Update {
                        self.close_superseded(&pending, &batch, &completions, &mut report).await;
                    }
                }
                Err(err) if err.is_shutdown() => {
                    info!(department, %operation, "Sync cycle stopped for shutdown");
                    return Err(err);
                }
                Err(err) => {
                    warn!(department, %operation, attempts = group.len(), error = %err, "Planner call failed, attempts stay pending");
                    report.failed_groups.push(GroupFailure {
                        operation,
                        attempts: group.len(),
                        error: err,
                    });
                }
            }
        }

        info!(
            department,
            sent = report.sent,
            succeeded = report.succeeded,
            resent = report.resent,
            fatal = report.fatal,
            unclassified = report.unclassified.len(),
            failed_groups = report.failed_groups.len(),
            "Sync cycle finished"
        );

        Ok(report)
    }

    /// Load an event together with its full attempt history.
    pub async fn load_event(&self, event_id: Uuid) -> Result<CalendarEvent> {
        let mut event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| PlannerSyncError::NotFound(format!("calendar event {event_id}")))?;
        event.sync_logs = self.sync_logs.sync_logs_for_event(event_id).await?;
        Ok(event)
    }

    /// Sync status of an event against the window currently in the calendar.
    pub async fn status_for(
        &self,
        event_id: Uuid,
        external: &CalendarWindow,
    ) -> Result<EventSyncStatus> {
        let event = self.load_event(event_id).await?;
        Ok(sync_status(&event, external))
    }

    /// Queue a create or update when the event is missing in Planner or has
    /// moved since its last completed sync.
    #[instrument(skip(self))]
    pub async fn queue_if_stale(
        &self,
        event_id: Uuid,
        external: &CalendarWindow,
    ) -> Result<Option<SyncAttempt>> {
        let event = self.load_event(event_id).await?;
        let status = sync_status(&event, external);
        let Some(operation) = status.next_operation() else {
            debug!(%event_id, ?status, "Nothing to queue");
            return Ok(None);
        };

        let attempt = SyncAttempt::new(event.id, operation, *external, self.clock.now());
        self.sync_logs.insert_sync_log(&attempt).await?;
        debug!(%event_id, ?status, %operation, sync_log_id = %attempt.id, "Queued sync log");
        Ok(Some(attempt))
    }

    /// Flag an event as deleted and queue a delete for it.
    ///
    /// Nothing is queued when Planner never held the item, i.e. no attempt
    /// succeeded and no create was answered with "already exists". Attempts
    /// still pending for such an event are withdrawn locally.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: Uuid) -> Result<Option<SyncAttempt>> {
        let mut event = self.load_event(event_id).await?;
        if event.is_deleted {
            return Ok(None);
        }

        event.mark_deleted();
        self.events.save_event(&event).await?;

        let Some(latest) = latest_attempt(&event.sync_logs) else {
            debug!(%event_id, "Event never queued, no delete needed");
            return Ok(None);
        };
        if !planner_holds_item(&event) {
            self.withdraw_pending(&event).await?;
            debug!(%event_id, "Event never reached Planner, pending sync logs withdrawn");
            return Ok(None);
        }

        let attempt = latest.copy_to_new(SyncOperation::Delete, self.clock.now());
        self.sync_logs.insert_sync_log(&attempt).await?;
        Ok(Some(attempt))
    }

    async fn withdraw_pending(&self, event: &CalendarEvent) -> Result<()> {
        let completion = SyncCompletion::withdrawn(self.clock.now());
        for attempt in event.sync_logs.iter().filter(|a| a.is_pending()) {
            self.sync_logs.complete_sync_log(attempt.id, &completion).await?;
        }
        Ok(())
    }

    /// Send one group, recording the call. Returns the call id and results.
    async fn send_group(
        &self,
        operation: SyncOperation,
        group: &[SyncAttempt],
    ) -> Result<(Uuid, Vec<RemoteItemResult>)> {
        let correlation_id = Uuid::now_v7().to_string();
        let mut call = ServiceCallReferenceLog::start(operation, &correlation_id, self.clock.now());
        self.calls.insert_call(&call).await?;

        let label = call_label(operation);
        let client = &self.client;
        let correlation = correlation_id.as_str();
        let limit = self.call_timeout;
        let outcome = self
            .retrier
            .retry(label, || async move {
                with_call_timeout(limit, async {
                    match operation {
                        SyncOperation::Create => client.create_events(group, correlation).await,
                        SyncOperation::Update => client.update_events(group, correlation).await,
                        SyncOperation::Delete => client.delete_events(group, correlation).await,
                    }
                })
                .await
            })
            .await;

        let result = match outcome {
            Ok(results) => {
                call.finish(true, Some(format!("{} item results", results.len())), self.clock.now());
                Ok((call.id, results))
            }
            Err(err) => {
                let err = retry_error_to_domain(label, err);
                call.finish(false, Some(err.to_string()), self.clock.now());
                Err(err)
            }
        };

        if let Err(err) = self.calls.update_call(&call).await {
            warn!(call_id = %call.id, error = %err, "Failed to record service call outcome");
        }

        result
    }

    async fn record_outcomes(
        &self,
        call_id: Uuid,
        group: &[SyncAttempt],
        results: &[RemoteItemResult],
        completions: &mut HashMap<Uuid, SyncCompletion>,
        report: &mut SyncCycleReport,
    ) {
        let by_id: HashMap<Uuid, &RemoteItemResult> =
            results.iter().map(|result| (result.sync_log_id, result)).collect();
        let now = self.clock.now();

        for attempt in group {
            let Some(result) = by_id.get(&attempt.id) else {
                warn!(sync_log_id = %attempt.id, "Planner returned no result for sync log");
                report.unanswered += 1;
                continue;
            };

            let completion = if result.success {
                SyncCompletion::succeeded(now, Some(call_id))
            } else {
                SyncCompletion::failed(now, result.error_code, Some(call_id))
            };

            if let Err(err) = self.sync_logs.complete_sync_log(attempt.id, &completion).await {
                error!(sync_log_id = %attempt.id, error = %err, "Failed to record sync log outcome");
                continue;
            }
            completions.insert(attempt.id, completion);

            let mut completed = attempt.clone();
            completed.complete(&completion);
            self.handle_outcome(&completed, report).await;
        }
    }

    async fn handle_outcome(&self, completed: &SyncAttempt, report: &mut SyncCycleReport) {
        let outcome = match classify(completed) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(sync_log_id = %completed.id, error = %err, "Cannot classify sync log");
                return;
            }
        };

        match outcome {
            AttemptOutcome::Succeeded => report.succeeded += 1,
            AttemptOutcome::CreateUnsuccessfulItemAlreadyExists => {
                debug!(sync_log_id = %completed.id, "Item already exists in Planner, treated as created");
                report.succeeded += 1;
            }
            AttemptOutcome::UpdateUnsuccessfulItemNotInRemote => {
                warn!(sync_log_id = %completed.id, event_id = %completed.event_id, "Update target no longer exists in Planner");
                report.not_in_remote.push(completed.event_id);
            }
            AttemptOutcome::PlannerOriginated { code } => {
                warn!(sync_log_id = %completed.id, code, "Change conflicts with an edit made in Planner, not resent");
                report.planner_originated += 1;
            }
            AttemptOutcome::Fatal { code } => {
                warn!(sync_log_id = %completed.id, code, "Fatal Planner error, not resent");
                report.fatal += 1;
            }
            AttemptOutcome::Transient { code } => {
                let resend = completed.copy_to_new(completed.operation, self.clock.now());
                match self.sync_logs.insert_sync_log(&resend).await {
                    Ok(()) => {
                        debug!(sync_log_id = %completed.id, resend_id = %resend.id, code, "Transient Planner error, queued again");
                        report.resent += 1;
                    }
                    Err(err) => {
                        error!(sync_log_id = %completed.id, code, error = %err, "Failed to queue resend");
                    }
                }
            }
            AttemptOutcome::Unclassified { code } => {
                error!(sync_log_id = %completed.id, code = ?code, "Unclassified Planner error, needs operator attention");
                report.unclassified.push(completed.id);
            }
        }
    }

    async fn close_superseded(
        &self,
        pending: &[SyncAttempt],
        batch: &SyncLogBatch,
        completions: &HashMap<Uuid, SyncCompletion>,
        report: &mut SyncCycleReport,
    ) {
        for superseded in pending.iter().filter(|a| batch.superseded_updates.contains(&a.id)) {
            let Some(completion) = batch
                .superseding_update(superseded)
                .and_then(|winner| completions.get(&winner.id))
            else {
                continue;
            };

            match self.sync_logs.complete_sync_log(superseded.id, completion).await {
                Ok(()) => report.superseded += 1,
                Err(err) => {
                    error!(sync_log_id = %superseded.id, error = %err, "Failed to close superseded sync log");
                }
            }
        }
    }
}

fn planner_holds_item(event: &CalendarEvent) -> bool {
    event.sync_logs.iter().any(|attempt| {
        matches!(
            classify(attempt),
            Ok(AttemptOutcome::Succeeded | AttemptOutcome::CreateUnsuccessfulItemAlreadyExists)
        )
    })
}

fn call_label(operation: SyncOperation) -> &'static str {
    match operation {
        SyncOperation::Create => "create_events",
        SyncOperation::Update => "update_events",
        SyncOperation::Delete => "delete_events",
    }
}
