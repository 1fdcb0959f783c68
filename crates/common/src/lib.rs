//! Shared utilities for the planner-sync crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction for deterministic timestamps
//! - `observability`: tracing for the runtime modules
//! - `runtime`: async infrastructure (busy-aware retry with backoff)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

#[cfg(feature = "runtime")]
pub use resilience::{BackoffConfig, BackoffRetrier, BusySignal, RetryError, RetryResult};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
