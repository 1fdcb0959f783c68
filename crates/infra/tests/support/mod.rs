//! Shared fixtures for `planner-sync-infra` integration tests.
//!
//! One in-memory store backs every core port, and a small Planner fake
//! answers either "accepted" or "busy".

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use planner_sync_common::resilience::{BackoffConfig, BackoffRetrier};
use planner_sync_core::planner_ports::PlannerError;
use planner_sync_core::{
    CalendarEventRepository, PlannerClient, ResourceReconciler, ResourceRepository,
    ServiceCallLogRepository, SyncLogRepository, SyncService,
};
use planner_sync_domain::{
    CalendarEvent, CalendarWindow, ExternalResource, PlannerSyncError, RemoteItemResult, Resource,
    Result as DomainResult, ServiceCallReferenceLog, SyncAttempt, SyncCompletion, SyncOperation,
};
use planner_sync_infra::SyncPorts;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 8, 8, 0, 0).unwrap()
}

/// Everything the core services persist, kept in memory.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<HashMap<Uuid, CalendarEvent>>,
    sync_logs: Mutex<Vec<SyncAttempt>>,
    calls: Mutex<Vec<ServiceCallReferenceLog>>,
    resources: Mutex<Vec<Resource>>,
}

impl MemoryStore {
    /// Add an event in `department` with one pending create attempt.
    pub fn add_pending_create(&self, department: &str) -> SyncAttempt {
        let mut event = CalendarEvent::new(department, format!("item-{}", Uuid::now_v7()), t0());
        let window = CalendarWindow::new(t0(), t0() + chrono::Duration::hours(1));
        let attempt = event.queue_attempt(SyncOperation::Create, window, t0());
        event.sync_logs.clear();
        self.events.lock().insert(event.id, event);
        self.sync_logs.lock().push(attempt.clone());
        attempt
    }

    pub fn pending_count(&self) -> usize {
        self.sync_logs.lock().iter().filter(|a| a.is_pending()).count()
    }

    pub fn active_resources(&self, department: &str) -> usize {
        self.resources
            .lock()
            .iter()
            .filter(|r| r.department == department && !r.is_deleted())
            .count()
    }
}

#[async_trait]
impl CalendarEventRepository for MemoryStore {
    async fn get_event(&self, id: Uuid) -> DomainResult<Option<CalendarEvent>> {
        Ok(self.events.lock().get(&id).cloned())
    }

    async fn save_event(&self, event: &CalendarEvent) -> DomainResult<()> {
        self.events.lock().insert(event.id, event.clone());
        Ok(())
    }
}

#[async_trait]
impl SyncLogRepository for MemoryStore {
    async fn pending_sync_logs(&self, department: &str) -> DomainResult<Vec<SyncAttempt>> {
        let events = self.events.lock();
        Ok(self
            .sync_logs
            .lock()
            .iter()
            .filter(|a| a.is_pending())
            .filter(|a| events.get(&a.event_id).is_some_and(|e| e.department == department))
            .cloned()
            .collect())
    }

    async fn sync_logs_for_event(&self, event_id: Uuid) -> DomainResult<Vec<SyncAttempt>> {
        let mut logs: Vec<SyncAttempt> =
            self.sync_logs.lock().iter().filter(|a| a.event_id == event_id).cloned().collect();
        logs.sort_by_key(SyncAttempt::recency_key);
        Ok(logs)
    }

    async fn insert_sync_log(&self, attempt: &SyncAttempt) -> DomainResult<()> {
        self.sync_logs.lock().push(attempt.clone());
        Ok(())
    }

    async fn complete_sync_log(&self, id: Uuid, completion: &SyncCompletion) -> DomainResult<()> {
        let mut logs = self.sync_logs.lock();
        let attempt = logs
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PlannerSyncError::NotFound(format!("sync log {id}")))?;
        attempt.complete(completion);
        Ok(())
    }
}

#[async_trait]
impl ServiceCallLogRepository for MemoryStore {
    async fn insert_call(&self, call: &ServiceCallReferenceLog) -> DomainResult<()> {
        self.calls.lock().push(call.clone());
        Ok(())
    }

    async fn update_call(&self, call: &ServiceCallReferenceLog) -> DomainResult<()> {
        let mut calls = self.calls.lock();
        if let Some(existing) = calls.iter_mut().find(|c| c.id == call.id) {
            *existing = call.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for MemoryStore {
    async fn resources_for_department(&self, department: &str) -> DomainResult<Vec<Resource>> {
        Ok(self.resources.lock().iter().filter(|r| r.department == department).cloned().collect())
    }

    async fn insert_resources(&self, resources: &[Resource]) -> DomainResult<()> {
        self.resources.lock().extend_from_slice(resources);
        Ok(())
    }

    async fn soft_delete_resources(&self, ids: &[Uuid], deleted_at: DateTime<Utc>) -> DomainResult<()> {
        for resource in self.resources.lock().iter_mut().filter(|r| ids.contains(&r.id)) {
            resource.deleted_date = Some(deleted_at);
        }
        Ok(())
    }
}

/// Planner fake that accepts every item unless told to answer busy.
#[derive(Default)]
pub struct FakePlanner {
    busy: AtomicBool,
    event_calls: AtomicU32,
    resource_calls: AtomicU32,
    rejected_departments: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl FakePlanner {
    pub fn always_busy(&self) {
        self.busy.store(true, Ordering::SeqCst);
    }

    /// Make `get_resources` fail permanently for `department`.
    pub fn reject_resources_for(&self, department: &str) {
        self.rejected_departments.lock().push(department.to_string());
    }

    /// Make every call take `delay` before answering.
    pub fn respond_after(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn event_calls(&self) -> u32 {
        self.event_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> u32 {
        self.resource_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn answer(&self, attempts: &[SyncAttempt]) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        if self.busy.load(Ordering::SeqCst) {
            return Err(PlannerError::Busy("503 Service Unavailable".into()));
        }
        Ok(attempts.iter().map(|a| RemoteItemResult::ok(a.id)).collect())
    }
}

#[async_trait]
impl PlannerClient for FakePlanner {
    async fn create_events(
        &self,
        attempts: &[SyncAttempt],
        _correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(attempts)
    }

    async fn update_events(
        &self,
        attempts: &[SyncAttempt],
        _correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(attempts)
    }

    async fn delete_events(
        &self,
        attempts: &[SyncAttempt],
        _correlation_id: &str,
    ) -> Result<Vec<RemoteItemResult>, PlannerError> {
        self.pause().await;
        self.answer(attempts)
    }

    async fn get_resources(&self, department: &str) -> Result<Vec<ExternalResource>, PlannerError> {
        self.pause().await;
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        if self.rejected_departments.lock().iter().any(|d| d == department) {
            return Err(PlannerError::Rejected(format!("unknown department {department}")));
        }
        if self.busy.load(Ordering::SeqCst) {
            return Err(PlannerError::Busy("503 Service Unavailable".into()));
        }
        Ok(vec![
            ExternalResource::new(format!("lead@{department}.example.com")),
            ExternalResource::new(format!("tech@{department}.example.com")),
        ])
    }
}

/// Core services wired to `store` and `planner`, with retriers bound to
/// child tokens of `shutdown`.
pub fn services(
    store: &Arc<MemoryStore>,
    planner: &Arc<FakePlanner>,
    shutdown: &CancellationToken,
    base_delay: Duration,
) -> (Arc<SyncService>, Arc<ResourceReconciler>) {
    let backoff =
        BackoffConfig::default().with_base_delay(base_delay).with_max_delay(base_delay.saturating_mul(4));

    let sync = SyncService::new(
        Arc::clone(store) as Arc<dyn CalendarEventRepository>,
        Arc::clone(store) as Arc<dyn SyncLogRepository>,
        Arc::clone(store) as Arc<dyn ServiceCallLogRepository>,
        Arc::clone(planner) as Arc<dyn PlannerClient>,
        BackoffRetrier::new(backoff.clone(), shutdown.child_token()),
    );
    let reconciler = ResourceReconciler::new(
        Arc::clone(planner) as Arc<dyn PlannerClient>,
        Arc::clone(store) as Arc<dyn ResourceRepository>,
        BackoffRetrier::new(backoff, shutdown.child_token()),
    );

    (Arc::new(sync), Arc::new(reconciler))
}

/// Every port of `store` and `planner`, for `build_services`.
pub fn ports(store: &Arc<MemoryStore>, planner: &Arc<FakePlanner>) -> SyncPorts {
    SyncPorts {
        events: Arc::clone(store) as Arc<dyn CalendarEventRepository>,
        sync_logs: Arc::clone(store) as Arc<dyn SyncLogRepository>,
        calls: Arc::clone(store) as Arc<dyn ServiceCallLogRepository>,
        resources: Arc::clone(store) as Arc<dyn ResourceRepository>,
        client: Arc::clone(planner) as Arc<dyn PlannerClient>,
    }
}

/// Poll `condition` until it holds or roughly two seconds pass.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
