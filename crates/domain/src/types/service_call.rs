//! Records of outbound Planner calls

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::SyncOperation;

/// One outbound remote call; several sync attempts may share it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCallReferenceLog {
    pub id: Uuid,
    pub correlation_id: String,
    pub operation: SyncOperation,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub response: Option<String>,
}

impl ServiceCallReferenceLog {
    pub fn start(
        operation: SyncOperation,
        correlation_id: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            correlation_id: correlation_id.into(),
            operation,
            started_at,
            ended_at: None,
            success: None,
            response: None,
        }
    }

    pub fn finish(&mut self, success: bool, response: Option<String>, ended_at: DateTime<Utc>) {
        self.success = Some(success);
        self.response = response;
        self.ended_at = Some(ended_at);
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Planner's answer for one attempt carried by a batched call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItemResult {
    pub sync_log_id: Uuid,
    pub success: bool,
    pub error_code: Option<i32>,
}

impl RemoteItemResult {
    pub fn ok(sync_log_id: Uuid) -> Self {
        Self { sync_log_id, success: true, error_code: None }
    }

    pub fn failed(sync_log_id: Uuid, error_code: i32) -> Self {
        Self { sync_log_id, success: false, error_code: Some(error_code) }
    }
}
