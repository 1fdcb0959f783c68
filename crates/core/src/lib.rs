//! # Planner Sync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The sync decision engine (error classification, event status, batching,
//!   resource reconciliation)
//! - Port/adapter interfaces (traits)
//! - Services that drive one sync or reconciliation run per department
//!
//! ## Architecture Principles
//! - Only depends on `planner-sync-common` and `planner-sync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod batch;
pub mod classification;
pub mod event_status;
pub mod planner_ports;
pub mod resources;
pub mod sync;

pub use batch::{build_batch, SyncLogBatch};
pub use classification::{classify, qualifies_for_resend, AttemptOutcome, OutcomeCategory};
pub use event_status::{latest_attempt, sync_status, EventSyncStatus};
pub use planner_ports::{PlannerClient, PlannerError};
pub use resources::{
    plan_reconciliation, ReconciliationPlan, ReconciliationReport, ResourceReconciler,
    ResourceRepository,
};
pub use sync::{
    CalendarEventRepository, ServiceCallLogRepository, SyncCycleReport, SyncLogRepository,
    SyncService,
};
