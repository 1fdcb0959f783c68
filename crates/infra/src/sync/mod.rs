//! Background synchronization
//!
//! [`SyncWorker`] drives the core services on a fixed interval: resource
//! reconciliation and one sync cycle per configured department.
//! [`build_services`] wires those services from the loaded configuration.

mod assembly;
mod errors;
mod worker;

pub use assembly::{build_services, SyncPorts};
pub use errors::WorkerError;
pub use worker::{SyncWorker, SyncWorkerConfig, TickSummary};
