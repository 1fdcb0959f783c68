//! Scriptable in-memory Planner client

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use planner_sync_core::planner_ports::{PlannerClient, PlannerError};
use planner_sync_domain::{ExternalResource, RemoteItemResult, SyncAttempt, SyncOperation};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One recorded call against the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: SyncOperation,
    pub sync_log_ids: Vec<Uuid>,
    pub correlation_id: String,
}

#[derive(Default)]
struct State {
    /// Failures returned by the next calls of an operation, in order.
    queued_failures: HashMap<SyncOperation, VecDeque<PlannerError>>,
    /// Failure returned by every call of an operation.
    failing: HashMap<SyncOperation, PlannerError>,
    /// Per-item error code keyed by event id.
    item_codes: HashMap<Uuid, i32>,
    /// Events whose items get no result at all.
    unanswered: HashSet<Uuid>,
    resources: HashMap<String, Vec<ExternalResource>>,
    resource_failures: VecDeque<PlannerError>,
    cancel_after_call: Option<CancellationToken>,
    /// Time every call takes before answering.
    delay: Option<Duration>,
    calls: Vec<RecordedCall>,
    resource_calls: usize,
}

/// In-memory `PlannerClient` whose answers are set up by the test.
#[derive(Default, Clone)]
pub struct ScriptedPlanner {
    state: Arc<Mutex<State>>,
}

impl ScriptedPlanner {
    pub fn fail_next(&self, operation: SyncOperation, error: PlannerError) {
        self.state.lock().queued_failures.entry(operation).or_default().push_back(error);
    }

    pub fn fail_always(&self, operation: SyncOperation, error: PlannerError) {
        self.state.lock().failing.insert(operation, error);
    }

    pub fn reject_item(&self, event_id: Uuid, code: i32) {
        self.state.lock().item_codes.insert(event_id, code);
    }

    pub fn accept_item(&self, event_id: Uuid) {
        self.state.lock().item_codes.remove(&event_id);
    }

    pub fn drop_result_for(&self, event_id: Uuid) {
        self.state.lock().unanswered.insert(event_id);
    }

    pub fn set_resources(&self, department: &str, resources: Vec<ExternalResource>) {
        self.state.lock().resources.insert(department.to_string(), resources);
    }

    pub fn fail_next_resource_call(&self, error: PlannerError) {
        self.state.lock().resource_failures.push_back(error);
    }

    /// Cancel `token` right after the next event call returns.
    pub fn cancel_after_call(&self, token: CancellationToken) {
        self.state.lock().cancel_after_call = Some(token);
    }

    /// Make every call wait `delay` before it is answered and recorded.
    pub fn delay_calls(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_for(&self, operation: SyncOperation) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.operation == operation).collect()
    }

    pub fn resource_calls(&self) -> usize {
        self.state.lock().resource_calls
    }

    async fn pause(&self) {
        let delay = self.state.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn answer(
        &self,
        operation: SyncOperation,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall {
            operation,
            sync_log_ids: attempts.iter().map(|a| a.id).collect(),
            correlation_id: correlation_id.to_string(),
        });
        if let Some(token) = state.cancel_after_call.take() {
            token.cancel();
        }

        if let Some(error) = state.queued_failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        if let Some(error) = state.failing.get(&operation) {
            return Err(error.clone());
        }

        Ok(attempts
            .iter()
            .filter(|a| !state.unanswered.contains(&a.event_id))
            .map(|a| match state.item_codes.get(&a.event_id) {
                Some(code) => RemoteItemResult::failed(a.id, *code),
                None => RemoteItemResult::ok(a.id),
            })
            .collect())
    }
}

#[async_trait]
impl PlannerClient for ScriptedPlanner {
    async fn create_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(SyncOperation::Create, attempts, correlation_id)
    }

    async fn update_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(SyncOperation::Update, attempts, correlation_id)
    }

    async fn delete_events(
        &self,
        attempts: &[SyncAttempt],
        correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(SyncOperation::Delete, attempts, correlation_id)
    }

    async fn get_resources(&self, department: &str) -> Result<Vec<ExternalResource>, PlannerError> {
        self.pause().await;
        let mut state = self.state.lock();
        state.resource_calls += 1;
        if let Some(error) = state.resource_failures.pop_front() {
            return Err(error);
        }
        Ok(state.resources.get(department).cloned().unwrap_or_default())
    }
}
