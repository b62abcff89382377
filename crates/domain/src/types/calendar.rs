//! Business calendar configuration types
//!
//! A weekly schedule (at most one rule per weekday) plus a set of holiday
//! exceptions. The calendar arithmetic itself lives in `deskline-core`.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{DesklineError, Result};

/// Working-hours rule for a single weekday.
///
/// Time-of-day only, no date component. `start < end` must hold whenever
/// `is_working_day` is true; [`BusinessWeek::new`] enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHoursRule {
    pub weekday: Weekday,
    pub is_working_day: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BusinessHoursRule {
    /// Create a working-day rule.
    pub fn working(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self { weekday, is_working_day: true, start, end }
    }

    /// Create a non-working-day rule.
    pub fn closed(weekday: Weekday) -> Self {
        Self { weekday, is_working_day: false, start: NaiveTime::MIN, end: NaiveTime::MIN }
    }
}

/// A validated weekly schedule: at most one rule per weekday.
///
/// An empty week means no business-hours semantics are configured; callers
/// degrade to wall-clock arithmetic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessWeek {
    rules: Vec<BusinessHoursRule>,
}

impl BusinessWeek {
    /// Build a week from rules, validating per-weekday uniqueness and
    /// `start < end` on working days.
    pub fn new(rules: Vec<BusinessHoursRule>) -> Result<Self> {
        let mut seen = [false; 7];
        for rule in &rules {
            let idx = rule.weekday.num_days_from_monday() as usize;
            if seen[idx] {
                return Err(DesklineError::InvalidInput(format!(
                    "duplicate business hours rule for {}",
                    rule.weekday
                )));
            }
            seen[idx] = true;

            if rule.is_working_day && rule.start >= rule.end {
                return Err(DesklineError::InvalidInput(format!(
                    "business hours for {} must start before they end",
                    rule.weekday
                )));
            }
        }
        Ok(Self { rules })
    }

    /// A week with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Whether any rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up the rule for a weekday, if one is configured.
    pub fn rule_for(&self, weekday: Weekday) -> Option<&BusinessHoursRule> {
        self.rules.iter().find(|rule| rule.weekday == weekday)
    }

    /// Borrow the underlying rules.
    pub fn rules(&self) -> &[BusinessHoursRule] {
        &self.rules
    }
}

/// A holiday exception to the weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    /// When set, the holiday matches by (month, day) in every year
    pub recurs_yearly: bool,
    /// Operator-facing label, not used in matching
    pub name: Option<String>,
}

impl Holiday {
    /// Whether this holiday falls on the given calendar date.
    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.recurs_yearly {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}
