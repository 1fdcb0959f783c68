//! Port interfaces for resource persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use planner_sync_domain::{Resource, Result};
use uuid::Uuid;

/// Trait for the local resource store
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// All resources of a department, soft-deleted ones included
    async fn resources_for_department(&self, department: &str) -> Result<Vec<Resource>>;

    async fn insert_resources(&self, resources: &[Resource]) -> Result<()>;

    /// Set `deleted_date` on the given resources
    async fn soft_delete_resources(&self, ids: &[Uuid], deleted_at: DateTime<Utc>) -> Result<()>;
}
