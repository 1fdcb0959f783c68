//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level so operators can raise
//! verbosity for a single module without editing the config file.

use planner_sync_domain::{LoggingConfig, PlannerSyncError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Output is human-readable by default and one JSON object per line when
/// `config.json` is set.
///
/// # Errors
/// Returns `PlannerSyncError::Config` if the level is not a valid filter
/// directive or a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true).with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| PlannerSyncError::Config(format!("Failed to install tracing subscriber: {e}")))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level)
            .map_err(|e| PlannerSyncError::Config(format!("Invalid log level '{level}': {e}")))
    })
}
