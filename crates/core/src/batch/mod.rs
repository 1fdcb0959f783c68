//! Outbound batching of pending sync attempts
//!
//! This module turns the pending attempt queue of a department into the
//! create/update/delete groups sent in the next Planner calls.

pub mod batcher;

pub use batcher::{build_batch, SyncLogBatch};
