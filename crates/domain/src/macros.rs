//! Macro for implementing Display and FromStr for status-like enums
//!
//! Sync operations and event statuses are persisted and logged by name, so
//! each enum needs a stable lower-case string form that parses back
//! case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use planner_sync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum CallState {
//!     Started,
//!     Finished,
//! }
//!
//! impl_domain_status_conversions!(CallState {
//!     Started => "started",
//!     Finished => "finished",
//! });
//!
//! assert_eq!(CallState::Started.to_string(), "started");
//! assert_eq!("FINISHED".parse::<CallState>().unwrap(), CallState::Finished);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lower-case string
///   representations
///
/// Parsing is case-insensitive; the error is a message naming the enum.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
