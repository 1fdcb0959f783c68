//! In-memory repository implementations for testing
//!
//! Each mock keeps its rows behind a `parking_lot::Mutex` and is cheap to
//! clone, so a test can hand one copy to the service and inspect another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use planner_sync_core::resources::ResourceRepository;
use planner_sync_core::sync::ports::{
    CalendarEventRepository, ServiceCallLogRepository, SyncLogRepository,
};
use planner_sync_domain::{
    CalendarEvent, PlannerSyncError, Resource, Result as DomainResult, ServiceCallReferenceLog,
    SyncAttempt, SyncCompletion,
};
use uuid::Uuid;

/// In-memory store for events and their sync logs.
///
/// Implements both `CalendarEventRepository` and `SyncLogRepository`, the
/// way a single database adapter would.
#[derive(Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<HashMap<Uuid, CalendarEvent>>>,
    sync_logs: Arc<Mutex<Vec<SyncAttempt>>>,
}

impl InMemoryEventStore {
    /// Store an event; its `sync_logs` are moved into the log table.
    pub fn with_event(self, mut event: CalendarEvent) -> Self {
        self.sync_logs.lock().extend(event.sync_logs.drain(..));
        self.events.lock().insert(event.id, event);
        self
    }

    pub fn add_sync_log(&self, attempt: SyncAttempt) {
        self.sync_logs.lock().push(attempt);
    }

    pub fn sync_log(&self, id: Uuid) -> Option<SyncAttempt> {
        self.sync_logs.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn all_sync_logs(&self) -> Vec<SyncAttempt> {
        self.sync_logs.lock().clone()
    }

    pub fn pending(&self) -> Vec<SyncAttempt> {
        self.sync_logs.lock().iter().filter(|a| a.is_pending()).cloned().collect()
    }

    pub fn event(&self, id: Uuid) -> Option<CalendarEvent> {
        self.events.lock().get(&id).cloned()
    }
}

#[async_trait]
impl CalendarEventRepository for InMemoryEventStore {
    async fn get_event(&self, id: Uuid) -> DomainResult<Option<CalendarEvent>> {
        Ok(self.events.lock().get(&id).cloned())
    }

    async fn save_event(&self, event: &CalendarEvent) -> DomainResult<()> {
        let mut row = event.clone();
        row.sync_logs.clear();
        self.events.lock().insert(event.id, row);
        Ok(())
    }
}

#[async_trait]
impl SyncLogRepository for InMemoryEventStore {
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

/// In-memory mock for `ServiceCallLogRepository`.
#[derive(Default, Clone)]
pub struct InMemoryCallLog {
    calls: Arc<Mutex<Vec<ServiceCallReferenceLog>>>,
}

impl InMemoryCallLog {
    pub fn calls(&self) -> Vec<ServiceCallReferenceLog> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ServiceCallLogRepository for InMemoryCallLog {
    async fn insert_call(&self, call: &ServiceCallReferenceLog) -> DomainResult<()> {
        self.calls.lock().push(call.clone());
        Ok(())
    }

    async fn update_call(&self, call: &ServiceCallReferenceLog) -> DomainResult<()> {
        let mut calls = self.calls.lock();
        match calls.iter_mut().find(|c| c.id == call.id) {
            Some(row) => {
                *row = call.clone();
                Ok(())
            }
            None => Err(PlannerSyncError::NotFound(format!("service call {}", call.id))),
        }
    }
}

/// In-memory mock for `ResourceRepository`.
#[derive(Default, Clone)]
pub struct InMemoryResourceStore {
    resources: Arc<Mutex<Vec<Resource>>>,
}

impl InMemoryResourceStore {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources: Arc::new(Mutex::new(resources)) }
    }

    pub fn all(&self) -> Vec<Resource> {
        self.resources.lock().clone()
    }

    pub fn active_count(&self) -> usize {
        self.resources.lock().iter().filter(|r| !r.is_deleted()).count()
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceStore {
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
