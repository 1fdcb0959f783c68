//! Application constants
//!
//! Defaults shared by configuration and the sync engine.

/// Creates sent per outbound call when nothing else is configured.
pub const DEFAULT_MAX_CREATE_BATCH_SIZE: usize = 50;

/// Seconds between two sync cycles of the worker.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Total attempts for a remote call that keeps answering "busy".
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 4;

/// Delay before the first retry of a busy remote call.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;

/// Growth factor applied to the delay on every further retry.
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;

/// Upper bound for a single backoff delay.
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 2_000;

/// Timeout for one outbound Planner call.
pub const DEFAULT_PLANNER_TIMEOUT_SECS: u64 = 30;

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";
