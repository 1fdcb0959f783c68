//! Port interfaces for calendar event and sync log persistence

use async_trait::async_trait;
use planner_sync_domain::{CalendarEvent, Result, ServiceCallReferenceLog, SyncAttempt, SyncCompletion};
use uuid::Uuid;

/// Trait for calendar event storage
#[async_trait]
pub trait CalendarEventRepository: Send + Sync {
    /// Get an event by id; its `sync_logs` may be left empty
    async fn get_event(&self, id: Uuid) -> Result<Option<CalendarEvent>>;

    /// Insert or replace the event row (attempts are stored separately)
    async fn save_event(&self, event: &CalendarEvent) -> Result<()>;
}

/// Trait for sync attempt storage
#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    /// Attempts of a department's events that have no `synced_at` yet
    async fn pending_sync_logs(&self, department: &str) -> Result<Vec<SyncAttempt>>;

    /// Full history of an event, ascending by `created_at`
    async fn sync_logs_for_event(&self, event_id: Uuid) -> Result<Vec<SyncAttempt>>;

    async fn insert_sync_log(&self, attempt: &SyncAttempt) -> Result<()>;

    /// Record the remote outcome of an attempt
    async fn complete_sync_log(&self, id: Uuid, completion: &SyncCompletion) -> Result<()>;
}

/// Trait for outbound call records
#[async_trait]
pub trait ServiceCallLogRepository: Send + Sync {
    async fn insert_call(&self, call: &ServiceCallReferenceLog) -> Result<()>;

    async fn update_call(&self, call: &ServiceCallReferenceLog) -> Result<()>;
}
