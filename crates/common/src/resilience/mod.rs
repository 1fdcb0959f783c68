//! Resilience patterns for calls against a remote that may be overloaded
//!
//! - **[`backoff`]**: bounded retry with exponential backoff, restricted to
//!   failures that signal "busy" and interruptible by a shutdown token

pub mod backoff;

pub use backoff::{
    BackoffConfig, BackoffRetrier, BusySignal, RetryError, RetryResult, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_MULTIPLIER,
};
