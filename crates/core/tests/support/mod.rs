//! Shared test helpers for `planner-sync-core` integration tests.
//!
//! In-memory implementations of every core port plus a scriptable Planner
//! client, so the integration tests can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod planner;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use planner_sync_common::resilience::{BackoffConfig, BackoffRetrier};
use planner_sync_common::time::MockClock;
use tokio_util::sync::CancellationToken;

/// Fixed start instant for deterministic timestamps.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 8, 8, 0, 0).unwrap()
}

pub fn mock_clock() -> Arc<MockClock> {
    Arc::new(MockClock::new(t0()))
}

/// Retrier with millisecond delays so busy scenarios run fast.
pub fn fast_retrier(shutdown: CancellationToken) -> BackoffRetrier {
    let config = BackoffConfig::default()
        .with_base_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(4));
    BackoffRetrier::new(config, shutdown)
}
