//! Calendar events and their sync attempt history
//!
//! A [`CalendarEvent`] owns an ordered history of [`SyncAttempt`] records.
//! Every sync cycle appends attempts; completed attempts only ever receive
//! their completion fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operation a sync attempt asks Planner to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

crate::impl_domain_status_conversions!(SyncOperation {
    Create => "create",
    Update => "update",
    Delete => "delete",
});

/// Start/end of a calendar item as seen at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Outcome of a finished remote call for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCompletion {
    pub synced_at: DateTime<Utc>,
    pub remote_success: bool,
    pub remote_error_code: Option<i32>,
    pub service_call_reference_id: Option<Uuid>,
}

impl SyncCompletion {
    pub fn succeeded(synced_at: DateTime<Utc>, service_call_reference_id: Option<Uuid>) -> Self {
        Self { synced_at, remote_success: true, remote_error_code: None, service_call_reference_id }
    }

    pub fn failed(
        synced_at: DateTime<Utc>,
        remote_error_code: Option<i32>,
        service_call_reference_id: Option<Uuid>,
    ) -> Self {
        Self { synced_at, remote_success: false, remote_error_code, service_call_reference_id }
    }

    /// Closed locally without any Planner call.
    pub fn withdrawn(synced_at: DateTime<Utc>) -> Self {
        Self::succeeded(synced_at, None)
    }
}

/// One proposed create/update/delete against Planner, with its outcome
///
/// `synced_at` stays `None` while the attempt is pending. Ids are UUID v7 so
/// they sort in creation order and break `created_at` ties deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAttempt {
    pub id: Uuid,
    pub event_id: Uuid,
    pub operation: SyncOperation,
    pub calendar_start: DateTime<Utc>,
    pub calendar_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub remote_success: Option<bool>,
    pub remote_error_code: Option<i32>,
    pub conflict_notification_sent: bool,
    pub service_call_reference_id: Option<Uuid>,
}

impl SyncAttempt {
    /// Create a pending attempt for `event_id`.
    pub fn new(
        event_id: Uuid,
        operation: SyncOperation,
        window: CalendarWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_id,
            operation,
            calendar_start: window.start,
            calendar_end: window.end,
            created_at,
            synced_at: None,
            remote_success: None,
            remote_error_code: None,
            conflict_notification_sent: false,
            service_call_reference_id: None,
        }
    }

    /// Fresh pending attempt for the same event and window under `operation`.
    pub fn copy_to_new(&self, operation: SyncOperation, created_at: DateTime<Utc>) -> Self {
        Self::new(self.event_id, operation, self.window(), created_at)
    }

    pub fn window(&self) -> CalendarWindow {
        CalendarWindow::new(self.calendar_start, self.calendar_end)
    }

    pub fn is_pending(&self) -> bool {
        self.synced_at.is_none()
    }

    /// True once a remote call answered with a failure for this attempt.
    pub fn is_failed(&self) -> bool {
        self.remote_success == Some(false)
    }

    /// Key used to order attempts by recency.
    pub fn recency_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }

    /// Record the remote outcome. Only the completion fields change.
    pub fn complete(&mut self, completion: &SyncCompletion) {
        self.synced_at = Some(completion.synced_at);
        self.remote_success = Some(completion.remote_success);
        self.remote_error_code = completion.remote_error_code;
        self.service_call_reference_id = completion.service_call_reference_id;
    }
}

/// A calendar item observed in a department's mailbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub department: String,
    /// Item id in the source mailbox.
    pub source_item_id: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_logs: Vec<SyncAttempt>,
}

impl CalendarEvent {
    pub fn new(
        department: impl Into<String>,
        source_item_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            department: department.into(),
            source_item_id: source_item_id.into(),
            is_deleted: false,
            created_at,
            sync_logs: Vec::new(),
        }
    }

    /// Append a pending attempt and return a copy of it for persistence.
    pub fn queue_attempt(
        &mut self,
        operation: SyncOperation,
        window: CalendarWindow,
        created_at: DateTime<Utc>,
    ) -> SyncAttempt {
        let attempt = SyncAttempt::new(self.id, operation, window, created_at);
        self.sync_logs.push(attempt.clone());
        attempt
    }

    /// Logical delete; the history is kept for audit.
    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }
}
