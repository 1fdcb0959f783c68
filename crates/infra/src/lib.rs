//! # Planner Sync Infrastructure
//!
//! Runtime plumbing around the core services.
//!
//! This crate contains:
//! - Configuration loading (environment variables, JSON/TOML files)
//! - Tracing subscriber setup
//! - Assembly of the core services from configuration
//! - The periodic sync worker
//!
//! ## Architecture
//! - Depends on `planner-sync-core` for services and ports
//! - Contains the "impure" code (environment, files, spawned tasks)

pub mod config;
pub mod observability;
pub mod sync;

pub use config::{backoff_config, load, load_from_env, load_from_file, probe_config_paths};
pub use observability::init_tracing;
pub use sync::{build_services, SyncPorts, SyncWorker, SyncWorkerConfig, TickSummary, WorkerError};
