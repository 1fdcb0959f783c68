//! Reconciliation of Planner resources against the local store

pub mod ports;
pub mod reconciler;
pub mod service;

pub use ports::ResourceRepository;
pub use reconciler::{plan_reconciliation, ReconciliationPlan};
pub use service::{ReconciliationReport, ResourceReconciler};
