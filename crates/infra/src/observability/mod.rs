//! Observability infrastructure
//!
//! Structured logging via `tracing`. Services in `planner-sync-core` emit
//! spans and events; this module installs the subscriber that renders them.

mod logging;

pub use logging::init_tracing;
