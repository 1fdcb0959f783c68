//! Time abstraction for testability
//!
//! Everything that stamps `created_at`/`synced_at` asks a [`Clock`] instead of
//! calling `Utc::now()` directly, so tests can pin and advance wall time.

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
