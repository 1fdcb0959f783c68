//! Configuration loader
//!
//! Loads the planner-sync configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `PLANNER_ENDPOINT`: Planner service endpoint
//! - `PLANNER_SYNC_DEPARTMENTS`: Comma-separated department list
//!
//! Optional (defaults in `planner_sync_domain::constants`):
//! - `PLANNER_SYNC_INTERVAL`: Sync interval in seconds
//! - `PLANNER_SYNC_MAX_CREATE_BATCH`: Creates sent per cycle
//! - `PLANNER_SYNC_ENABLED`: Whether sync is enabled (true/false)
//! - `PLANNER_TIMEOUT_SECONDS`: Upper bound for one Planner call
//! - `PLANNER_RETRY_MAX_ATTEMPTS`: Attempts per busy remote call
//! - `PLANNER_RETRY_BASE_DELAY_MS`: First backoff delay
//! - `PLANNER_RETRY_MULTIPLIER`: Backoff growth factor
//! - `PLANNER_RETRY_MAX_DELAY_MS`: Backoff delay cap
//! - `PLANNER_LOG_LEVEL`: Default tracing filter
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./planner-sync.{json,toml}` or `./config.{json,toml}` (current working
//!    directory)
//! 2. The same names one and two directories up
//! 3. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use planner_sync_common::resilience::{BackoffConfig, RetryError};
use planner_sync_domain::constants::DEFAULT_PLANNER_TIMEOUT_SECS;
use planner_sync_domain::{
    Config, LoggingConfig, PlannerConfig, PlannerSyncError, Result, RetrySettings, SyncConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["planner-sync.json", "planner-sync.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PlannerSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PlannerSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let endpoint = env_var("PLANNER_ENDPOINT")?;
    let departments = parse_departments(&env_var("PLANNER_SYNC_DEPARTMENTS")?);

    let sync_defaults = SyncConfig::default();
    let retry_defaults = RetrySettings::default();
    let logging_defaults = LoggingConfig::default();

    let config = Config {
        sync: SyncConfig {
            departments,
            interval_seconds: env_parse("PLANNER_SYNC_INTERVAL", sync_defaults.interval_seconds)?,
            max_create_batch_size: env_parse(
                "PLANNER_SYNC_MAX_CREATE_BATCH",
                sync_defaults.max_create_batch_size,
            )?,
            enabled: env_bool("PLANNER_SYNC_ENABLED", sync_defaults.enabled),
        },
        retry: RetrySettings {
            max_attempts: env_parse("PLANNER_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts)?,
            base_delay_ms: env_parse("PLANNER_RETRY_BASE_DELAY_MS", retry_defaults.base_delay_ms)?,
            multiplier: env_parse("PLANNER_RETRY_MULTIPLIER", retry_defaults.multiplier)?,
            max_delay_ms: env_parse("PLANNER_RETRY_MAX_DELAY_MS", retry_defaults.max_delay_ms)?,
        },
        planner: PlannerConfig {
            endpoint,
            timeout_seconds: env_parse("PLANNER_TIMEOUT_SECONDS", DEFAULT_PLANNER_TIMEOUT_SECS)?,
        },
        logging: LoggingConfig {
            level: std::env::var("PLANNER_LOG_LEVEL").unwrap_or(logging_defaults.level),
            json: logging_defaults.json,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PlannerSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PlannerSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PlannerSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PlannerSyncError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Convert retry settings into the retrier's configuration.
///
/// # Errors
/// Returns `PlannerSyncError::Config` if the settings are inconsistent.
pub fn backoff_config(settings: &RetrySettings) -> Result<BackoffConfig> {
    settings.validate()?;

    let config = BackoffConfig::default()
        .with_max_attempts(settings.max_attempts)
        .with_base_delay(Duration::from_millis(settings.base_delay_ms))
        .with_multiplier(settings.multiplier)
        .with_max_delay(Duration::from_millis(settings.max_delay_ms));

    config.validate().map_err(|e| match e {
        RetryError::InvalidConfiguration { message } => PlannerSyncError::Config(message),
        other => PlannerSyncError::Config(format!("{other:?}")),
    })?;
    Ok(config)
}

/// Parse configuration from string content; format follows the extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PlannerSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PlannerSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PlannerSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut bases = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        bases.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            bases.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    bases
        .iter()
        .flat_map(|base| CONFIG_FILE_NAMES.iter().map(move |name| base.join(name)))
        .find(|path| path.exists())
}

fn parse_departments(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|d| !d.is_empty()).map(str::to_string).collect()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PlannerSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PlannerSyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
