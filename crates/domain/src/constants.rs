//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Calendar search configuration
pub const CALENDAR_SCAN_DAYS: i64 = 14;

// Sweep cadence (cron expressions consumed by the infra scheduler)
pub const DEFAULT_OVERDUE_CRON: &str = "0 */15 * * * *"; // every 15 minutes
pub const DEFAULT_UPCOMING_CRON: &str = "0 0 * * * *"; // hourly
pub const DEFAULT_RECONCILE_CRON: &str = "0 30 3 * * *"; // daily, off-peak

// Advisory sweep configuration
pub const DEFAULT_LOOKAHEAD_MINUTES: i64 = 60;

// Database configuration
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
