//! Shared helpers for `deskline-infra` integration tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use deskline_core::Clock;
use deskline_domain::{BusinessHoursRule, BusinessWeek, DeadlineRecord, DueDates};
use deskline_infra::DbManager;
use tempfile::TempDir;
use uuid::Uuid;

/// A migrated database on a fresh temp directory.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn migrated_db() -> (Arc<DbManager>, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir created");
    let db_path = temp_dir.path().join("deskline.db");
    let manager = DbManager::new(&db_path, 4).expect("manager created");
    manager.run_migrations().expect("migrations run");
    (Arc::new(manager), temp_dir)
}

/// Parse an RFC 3339 instant.
pub fn instant(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 instant")
}

/// Mon-Fri 09:00-17:00.
pub fn office_week() -> BusinessWeek {
    let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid time");
    let rules = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        .into_iter()
        .map(|day| BusinessHoursRule::working(day, time(9, 0), time(17, 0)))
        .collect();
    BusinessWeek::new(rules).expect("valid office week")
}

/// A fresh record with the given due instants.
pub fn record_due(response: &str, resolution: &str) -> DeadlineRecord {
    DeadlineRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        DueDates { response_due_at: instant(response), resolution_due_at: instant(resolution) },
        instant("2026-03-02T09:00:00Z"),
    )
}

/// Manually-advanced clock for deterministic tests.
#[derive(Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = to;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}
