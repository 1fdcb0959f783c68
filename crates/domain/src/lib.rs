//! # Planner Sync Domain
//!
//! Business domain types and models for the calendar to Planner bridge.
//!
//! This crate contains:
//! - Calendar events, sync attempts and service call records
//! - Planner resources and their external counterparts
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other planner-sync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
