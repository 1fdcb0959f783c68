//! Sync status of a calendar event
//!
//! Pure decision over an event's attempt history and the window currently
//! observed in the source calendar. Nothing here mutates its inputs.

use planner_sync_domain::{CalendarEvent, CalendarWindow, SyncAttempt, SyncOperation};

/// Where an event stands relative to Planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSyncStatus {
    UpToDate,
    /// The source moved since the last completed sync.
    Updated,
    Deleted,
    /// The latest attempt has not been answered yet.
    PendingSyncLogs,
    /// Nothing was ever queued for this event.
    MissingSyncLogs,
}

impl EventSyncStatus {
    /// True when a new attempt has to be queued.
    pub fn requires_action(&self) -> bool {
        self.next_operation().is_some()
    }

    /// Operation to queue for this status, if any.
    ///
    /// `Deleted` yields nothing: deletes are queued by whoever flags the event.
    pub fn next_operation(&self) -> Option<SyncOperation> {
        match self {
            Self::Updated => Some(SyncOperation::Update),
            Self::MissingSyncLogs => Some(SyncOperation::Create),
            Self::UpToDate | Self::Deleted | Self::PendingSyncLogs => None,
        }
    }
}

/// Most recent attempt by `created_at`, ties broken by the greater id.
pub fn latest_attempt(attempts: &[SyncAttempt]) -> Option<&SyncAttempt> {
    attempts.iter().max_by_key(|attempt| attempt.recency_key())
}

/// Status of `event` against the window observed in the source calendar.
///
/// First match wins: deleted, no history, latest pending, window unchanged,
/// otherwise updated.
pub fn sync_status(event: &CalendarEvent, external: &CalendarWindow) -> EventSyncStatus {
    if event.is_deleted {
        return EventSyncStatus::Deleted;
    }

    let Some(latest) = latest_attempt(&event.sync_logs) else {
        return EventSyncStatus::MissingSyncLogs;
    };

    if latest.is_pending() {
        return EventSyncStatus::PendingSyncLogs;
    }

    if latest.window() == *external {
        EventSyncStatus::UpToDate
    } else {
        EventSyncStatus::Updated
    }
}
