//! Pure diff between the authoritative Planner list and local resources
//!
//! Identity is the normalized mail address. A mail address listed more than
//! once externally is ambiguous: it is neither added nor allowed to keep an
//! existing local record alive, and it is reported back to the caller.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use planner_sync_domain::{ExternalResource, Resource};
use uuid::Uuid;

/// Mutations that bring a department's local resources in line with Planner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub to_add: Vec<Resource>,
    pub to_soft_delete: Vec<Uuid>,
    /// Normalized addresses listed more than once externally, sorted.
    pub ambiguous_mail_addresses: Vec<String>,
}

impl ReconciliationPlan {
    /// True when applying the plan would not change local state.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_soft_delete.is_empty()
    }
}

/// Compute additions and soft-deletions for `department`.
///
/// Local resources of other departments and already soft-deleted ones are not
/// considered, so an address that comes back after removal gets a fresh
/// record. New records are stamped with `now`.
pub fn plan_reconciliation(
    external: &[ExternalResource],
    local: &[Resource],
    department: &str,
    now: DateTime<Utc>,
) -> ReconciliationPlan {
    let mut first_seen: Vec<(String, &ExternalResource)> = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    for entry in external {
        let key = entry.mail_key();
        if key.is_empty() {
            continue;
        }
        let count = occurrences.entry(key.clone()).or_insert(0);
        if *count == 0 {
            first_seen.push((key, entry));
        }
        *count += 1;
    }

    let mut ambiguous_mail_addresses: Vec<String> =
        occurrences.iter().filter(|(_, count)| **count > 1).map(|(key, _)| key.clone()).collect();
    ambiguous_mail_addresses.sort();

    let unique: Vec<(String, &ExternalResource)> =
        first_seen.into_iter().filter(|(key, _)| occurrences.get(key) == Some(&1)).collect();
    let unique_keys: HashSet<&str> = unique.iter().map(|(key, _)| key.as_str()).collect();

    let active_local: Vec<&Resource> = local
        .iter()
        .filter(|resource| resource.department == department && !resource.is_deleted())
        .collect();
    let active_keys: HashSet<String> = active_local.iter().map(|resource| resource.mail_key()).collect();

    let to_add = unique
        .iter()
        .filter(|(key, _)| !active_keys.contains(key))
        .map(|(_, entry)| Resource::from_external(entry, department, now))
        .collect();

    let to_soft_delete = active_local
        .iter()
        .filter(|resource| !unique_keys.contains(resource.mail_key().as_str()))
        .map(|resource| resource.id)
        .collect();

    ReconciliationPlan { to_add, to_soft_delete, ambiguous_mail_addresses }
}
