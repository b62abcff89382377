//! Due date computation
//!
//! Turns a policy's minute budgets into concrete due instants. Both
//! deadlines are measured independently from the same start instant, not
//! chained.

use chrono::{DateTime, Duration, Utc};
use deskline_domain::DueDates;

use super::BusinessCalendar;

/// Compute response and resolution due dates for a ticket.
///
/// When `business_hours_only` is set and a schedule is configured, both
/// budgets elapse in business time; otherwise in wall-clock time.
pub fn compute_due_dates(
    start: DateTime<Utc>,
    response_minutes: i64,
    resolution_minutes: i64,
    business_hours_only: bool,
    calendar: &BusinessCalendar,
) -> DueDates {
    if business_hours_only && calendar.has_schedule() {
        DueDates {
            response_due_at: calendar.add_business_minutes(start, response_minutes),
            resolution_due_at: calendar.add_business_minutes(start, resolution_minutes),
        }
    } else {
        DueDates {
            response_due_at: start + Duration::minutes(response_minutes),
            resolution_due_at: start + Duration::minutes(resolution_minutes),
        }
    }
}
