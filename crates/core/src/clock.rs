//! Clock capability
//!
//! Every component that needs "current time" receives a [`Clock`] instead of
//! calling `Utc::now()` directly, so calendar and sweep logic is
//! deterministically testable.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}
