//! Engine configuration structures
//!
//! Plain data; loading (env vars, file probing) lives in the infra crate.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CALENDAR_SCAN_DAYS, DEFAULT_DB_POOL_SIZE, DEFAULT_LOOKAHEAD_MINUTES, DEFAULT_OVERDUE_CRON,
    DEFAULT_RECONCILE_CRON, DEFAULT_UPCOMING_CRON,
};

/// Top-level configuration for the SLA engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
    pub sweep: SweepConfig,
    pub calendar: CalendarConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Sweep scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Cron expression for the overdue sweep
    #[serde(default = "default_overdue_cron")]
    pub overdue_cron: String,
    /// Cron expression for the upcoming-breach advisory sweep
    #[serde(default = "default_upcoming_cron")]
    pub upcoming_cron: String,
    /// Cron expression for the daily reconciliation pass
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
    /// Advisory lookahead window in minutes
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: i64,
    /// Whether the sweep scheduler is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Business calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Upper bound (days) for the next-open-window forward scan
    #[serde(default = "default_scan_days")]
    pub scan_days: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            overdue_cron: DEFAULT_OVERDUE_CRON.to_string(),
            upcoming_cron: DEFAULT_UPCOMING_CRON.to_string(),
            reconcile_cron: DEFAULT_RECONCILE_CRON.to_string(),
            lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
            enabled: true,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { scan_days: CALENDAR_SCAN_DAYS }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_overdue_cron() -> String {
    DEFAULT_OVERDUE_CRON.to_string()
}

fn default_upcoming_cron() -> String {
    DEFAULT_UPCOMING_CRON.to_string()
}

fn default_reconcile_cron() -> String {
    DEFAULT_RECONCILE_CRON.to_string()
}

fn default_lookahead_minutes() -> i64 {
    DEFAULT_LOOKAHEAD_MINUTES
}

fn default_scan_days() -> i64 {
    CALENDAR_SCAN_DAYS
}

fn default_true() -> bool {
    true
}
