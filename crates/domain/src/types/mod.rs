//! Domain types and models

pub mod calendar;
pub mod resource;
pub mod service_call;

pub use calendar::{CalendarEvent, CalendarWindow, SyncAttempt, SyncCompletion, SyncOperation};
pub use resource::{normalize_mail_address, ExternalResource, Resource};
pub use service_call::{RemoteItemResult, ServiceCallReferenceLog};
