//! Business calendar arithmetic
//!
//! Answers "is instant T inside business hours?" and "what is the next open
//! window at/after T?", and advances an instant by a budget of business
//! minutes. Schedules are weekly working-hours rules plus holiday
//! exceptions; times of day are interpreted on the UTC timeline.
//!
//! When no rules are configured, or when the forward scan finds no open
//! window within the configured bound, arithmetic degrades to plain
//! wall-clock addition. The degradation is logged, never silent.

mod due_dates;

pub use due_dates::compute_due_dates;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use deskline_domain::constants::CALENDAR_SCAN_DAYS;
use deskline_domain::{BusinessWeek, Holiday};
use tracing::warn;

/// A contiguous span of open business time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OpenWindow {
    /// Length of the window.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Weekly schedule plus holiday exceptions, ready for calendar queries.
///
/// Holds a snapshot of the configuration: admin edits to the shared tables
/// do not retroactively change due dates computed from an earlier snapshot.
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    week: BusinessWeek,
    holidays: Vec<Holiday>,
    scan_days: i64,
}

impl BusinessCalendar {
    /// Create a calendar with the default forward-scan bound.
    pub fn new(week: BusinessWeek, holidays: Vec<Holiday>) -> Self {
        Self { week, holidays, scan_days: CALENDAR_SCAN_DAYS }
    }

    /// Override the forward-scan bound (days).
    pub fn with_scan_days(mut self, scan_days: i64) -> Self {
        self.scan_days = scan_days.max(0);
        self
    }

    /// Whether any weekly rules are configured at all.
    pub fn has_schedule(&self) -> bool {
        !self.week.is_empty()
    }

    /// Whether the given calendar date is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|holiday| holiday.matches(date))
    }

    /// Whether `instant` falls inside business hours.
    ///
    /// Holidays close the whole day. Otherwise the weekday rule decides;
    /// the time-of-day containment is inclusive at both window edges.
    pub fn is_open(&self, instant: DateTime<Utc>) -> bool {
        let date = instant.date_naive();
        if self.is_holiday(date) {
            return false;
        }
        match self.week.rule_for(date.weekday()) {
            Some(rule) if rule.is_working_day => {
                let time = instant.time();
                time >= rule.start && time <= rule.end
            }
            _ => false,
        }
    }

    /// The next open window at or after `from`.
    ///
    /// If `from` lies inside a window, the remainder of that window is
    /// returned. The forward scan is bounded to `scan_days` days; `None`
    /// means the calendar is unusable within the bound and the caller must
    /// fall back to wall-clock arithmetic.
    pub fn next_open_window(&self, from: DateTime<Utc>) -> Option<OpenWindow> {
        let start_date = from.date_naive();
        for offset in 0..=self.scan_days {
            let date = start_date + Duration::days(offset);
            if self.is_holiday(date) {
                continue;
            }
            let Some(rule) = self.week.rule_for(date.weekday()) else { continue };
            if !rule.is_working_day {
                continue;
            }

            let window_start = date.and_time(rule.start).and_utc();
            let window_end = date.and_time(rule.end).and_utc();
            if from >= window_end {
                // Today's window is already behind us
                continue;
            }
            let start = if from > window_start { from } else { window_start };
            return Some(OpenWindow { start, end: window_end });
        }
        None
    }

    /// Advance `start` by `minutes` of business time.
    ///
    /// Consumes open windows until the budget fits inside one. With no
    /// configured schedule, or once no window can be found within the scan
    /// bound, the remaining budget is added as wall-clock time.
    pub fn add_business_minutes(&self, start: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        if !self.has_schedule() {
            return start + Duration::minutes(minutes);
        }

        let mut remaining = Duration::minutes(minutes.max(0));
        let mut cursor = start;
        while remaining > Duration::zero() {
            match self.next_open_window(cursor) {
                Some(window) => {
                    let span = window.span();
                    if remaining <= span {
                        return window.start + remaining;
                    }
                    remaining = remaining - span;
                    cursor = window.end;
                }
                None => {
                    warn!(
                        cursor = %cursor,
                        remaining_minutes = remaining.num_minutes(),
                        scan_days = self.scan_days,
                        "no open business window within scan bound, falling back to wall-clock"
                    );
                    return cursor + remaining;
                }
            }
        }
        cursor
    }
}
