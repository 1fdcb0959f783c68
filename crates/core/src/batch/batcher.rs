use std::collections::HashMap;

use planner_sync_domain::{SyncAttempt, SyncOperation};
use uuid::Uuid;

/// Attempts selected for the next outbound calls, grouped by operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncLogBatch {
    pub creates: Vec<SyncAttempt>,
    pub updates: Vec<SyncAttempt>,
    pub deletes: Vec<SyncAttempt>,
    /// Update attempts dropped in favour of a newer one for the same event.
    ///
    /// They are not sent; the caller closes them with the outcome of the
    /// update that replaced them.
    pub superseded_updates: Vec<Uuid>,
}

impl SyncLogBatch {
    /// Number of attempts that will be sent.
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Groups paired with their operation, skipping empty ones.
    pub fn groups(&self) -> impl Iterator<Item = (SyncOperation, &[SyncAttempt])> {
        [
            (SyncOperation::Create, self.creates.as_slice()),
            (SyncOperation::Update, self.updates.as_slice()),
            (SyncOperation::Delete, self.deletes.as_slice()),
        ]
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
    }

    /// The update in this batch that replaced `superseded`.
    pub fn superseding_update(&self, superseded: &SyncAttempt) -> Option<&SyncAttempt> {
        self.updates.iter().find(|winner| winner.event_id == superseded.event_id)
    }
}

/// Build the next batch from the pending queue.
///
/// - Completed attempts in the input are ignored.
/// - Updates keep only the most recent attempt per event.
/// - At most `max_create_batch_size` creates are taken, oldest first.
///   Updates and deletes are never capped.
/// - Each group is ordered oldest first, ties by id.
pub fn build_batch(pending: &[SyncAttempt], max_create_batch_size: usize) -> SyncLogBatch {
    let mut creates = Vec::new();
    let mut deletes = Vec::new();
    let mut latest_update: HashMap<Uuid, &SyncAttempt> = HashMap::new();
    let mut superseded_updates = Vec::new();

    for attempt in pending.iter().filter(|attempt| attempt.is_pending()) {
        match attempt.operation {
            SyncOperation::Create => creates.push(attempt.clone()),
            SyncOperation::Delete => deletes.push(attempt.clone()),
            SyncOperation::Update => match latest_update.get_mut(&attempt.event_id) {
                Some(current) if current.recency_key() >= attempt.recency_key() => {
                    superseded_updates.push(attempt.id);
                }
                Some(current) => {
                    superseded_updates.push(current.id);
                    *current = attempt;
                }
                None => {
                    latest_update.insert(attempt.event_id, attempt);
                }
            },
        }
    }

    let mut updates: Vec<SyncAttempt> = latest_update.into_values().cloned().collect();

    sort_oldest_first(&mut creates);
    sort_oldest_first(&mut updates);
    sort_oldest_first(&mut deletes);
    creates.truncate(max_create_batch_size);
    superseded_updates.sort();

    SyncLogBatch { creates, updates, deletes, superseded_updates }
}

fn sort_oldest_first(group: &mut [SyncAttempt]) {
    group.sort_by_key(SyncAttempt::recency_key);
}
