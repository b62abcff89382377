//! Scheduling infrastructure for the periodic breach sweeps
//!
//! The engine exposes sweep entry points; this module owns the cadence:
//! - Overdue sweep (default every 15 minutes)
//! - Upcoming-breach advisory sweep (default hourly)
//! - Full reconciliation pass (default daily)
//!
//! Schedulers follow explicit lifecycle rules: start/stop methods, join
//! handles for spawned tasks, cancellation token support, and timeout
//! wrapping on all async operations.

pub mod error;
pub mod sweep_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sweep_scheduler::{SweepScheduler, SweepSchedulerConfig};
