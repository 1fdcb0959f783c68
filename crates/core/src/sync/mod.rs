//! Synchronization of calendar events to Planner

pub mod ports;
pub mod service;

pub use ports::{CalendarEventRepository, ServiceCallLogRepository, SyncLogRepository};
pub use service::{GroupFailure, SyncCycleReport, SyncService};
