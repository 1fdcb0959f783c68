//! Configuration structures
//!
//! Loaded by `planner-sync-infra` from environment variables or a JSON/TOML
//! file. Every section except `planner` has usable defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_CREATE_BATCH_SIZE, DEFAULT_PLANNER_TIMEOUT_SECS,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY_MS,
    DEFAULT_RETRY_MULTIPLIER, DEFAULT_SYNC_INTERVAL_SECS,
};
use crate::errors::{PlannerSyncError, Result};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    pub planner: PlannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.planner.endpoint.trim().is_empty() {
            return Err(PlannerSyncError::Config("planner.endpoint must not be empty".into()));
        }
        if self.planner.timeout_seconds == 0 {
            return Err(PlannerSyncError::Config("planner.timeout_seconds must be > 0".into()));
        }
        if self.sync.max_create_batch_size == 0 {
            return Err(PlannerSyncError::Config("sync.max_create_batch_size must be > 0".into()));
        }
        if self.sync.interval_seconds == 0 {
            return Err(PlannerSyncError::Config("sync.interval_seconds must be > 0".into()));
        }
        self.retry.validate()
    }
}

/// Synchronization cycle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Departments (tenants) the worker synchronizes, each in its own cycle.
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_max_create_batch_size")]
    pub max_create_batch_size: usize,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            departments: Vec::new(),
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
            max_create_batch_size: DEFAULT_MAX_CREATE_BATCH_SIZE,
            enabled: true,
        }
    }
}

/// Backoff settings for remote calls answering "busy"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetrySettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(PlannerSyncError::Config("retry.max_attempts must be > 0".into()));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(PlannerSyncError::Config(format!(
                "retry.multiplier must be a finite value >= 1.0, got {}",
                self.multiplier
            )));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(PlannerSyncError::Config(format!(
                "retry.base_delay_ms ({}) cannot exceed retry.max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            multiplier: DEFAULT_RETRY_MULTIPLIER,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

/// Outbound Planner service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_interval_seconds() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_max_create_batch_size() -> usize {
    DEFAULT_MAX_CREATE_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

fn default_multiplier() -> f64 {
    DEFAULT_RETRY_MULTIPLIER
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_RETRY_MAX_DELAY_MS
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_PLANNER_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
