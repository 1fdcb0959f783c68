//! Planner resources (staff) and their authoritative external entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource as persisted locally for one department
///
/// Soft-deleted via `deleted_date`; never physically removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub department: String,
    pub mail_address: String,
    pub group_affinity: Option<String>,
    pub deleted_date: Option<DateTime<Utc>>,
    /// Last sync error reported for this resource, if any.
    pub error_code: Option<i32>,
    /// Correlation id on the Planner side.
    pub external_id: Option<String>,
    pub display_name: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl Resource {
    /// Seed a new local record from an external entry.
    pub fn from_external(
        external: &ExternalResource,
        department: impl Into<String>,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            department: department.into(),
            mail_address: external.mail_address.trim().to_string(),
            group_affinity: external.group_affinity.clone(),
            deleted_date: None,
            error_code: None,
            external_id: external.external_id.clone(),
            display_name: external.display_name.clone(),
            created_date,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_date.is_some()
    }

    /// Lower-cased, trimmed mail address used as the natural key.
    pub fn mail_key(&self) -> String {
        normalize_mail_address(&self.mail_address)
    }

    /// Mail address present, not soft-deleted, group affinity set and no
    /// outstanding error code.
    pub fn is_qualified_for_synchronization(&self) -> bool {
        !self.mail_address.trim().is_empty()
            && !self.is_deleted()
            && self.group_affinity.as_deref().is_some_and(|g| !g.trim().is_empty())
            && self.error_code.is_none()
    }
}

/// Resource entry from the authoritative Planner list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResource {
    pub mail_address: String,
    pub group_affinity: Option<String>,
    pub external_id: Option<String>,
    pub display_name: Option<String>,
}

impl ExternalResource {
    pub fn new(mail_address: impl Into<String>) -> Self {
        Self {
            mail_address: mail_address.into(),
            group_affinity: None,
            external_id: None,
            display_name: None,
        }
    }

    pub fn with_group_affinity(mut self, group: impl Into<String>) -> Self {
        self.group_affinity = Some(group.into());
        self
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn mail_key(&self) -> String {
        normalize_mail_address(&self.mail_address)
    }
}

/// Mail addresses compare case-insensitively and ignore surrounding blanks.
pub fn normalize_mail_address(address: &str) -> String {
    address.trim().to_lowercase()
}
