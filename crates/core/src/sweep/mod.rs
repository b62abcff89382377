//! Breach sweeps
//!
//! Periodic scans that flag newly-overdue records as breached exactly once
//! and report deadlines approaching breach. The engine does not own the
//! cadence; an external scheduler calls the entry points here.

mod service;

pub use service::{BreachSweeper, SweepFailure, SweepReport};
