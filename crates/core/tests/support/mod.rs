//! Shared test helpers for `deskline-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that
//! the deadline and sweep tests can focus on behaviour instead of
//! boilerplate.

pub mod clock;
pub mod events;
pub mod repositories;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use deskline_domain::{BusinessHoursRule, BusinessWeek};

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
