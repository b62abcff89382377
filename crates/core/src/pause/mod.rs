//! Pause controller
//!
//! Opens and closes pause intervals on a [`DeadlineRecord`] and extends
//! not-yet-breached due dates by the elapsed pause duration on resume.
//!
//! The transitions are pure: callers wrap them in a per-record
//! read-modify-write so concurrent pause/resume on one ticket is serialized
//! by the persistence layer.

use chrono::{DateTime, Duration, Utc};
use deskline_domain::{DeadlineRecord, DesklineError, PauseInterval, Result};

/// Open a pause interval on the record.
///
/// The deadline numbers themselves are untouched; the clock simply stops
/// accruing until [`resume`]. Fails with `AlreadyPaused` if an open
/// interval exists.
pub fn pause(
    record: &mut DeadlineRecord,
    reason: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<()> {
    if record.paused || record.open_pause().is_some() {
        return Err(DesklineError::AlreadyPaused(record.ticket_id.to_string()));
    }

    record
        .pause_intervals
        .push(PauseInterval { started_at: now, ended_at: None, reason: reason.into() });
    record.paused = true;
    Ok(())
}

/// Close the open pause interval and extend still-live deadlines.
///
/// Each deadline is considered independently: it is extended by the elapsed
/// pause duration only if its breach flag is still false and the deadline
/// instant lies after the pause start. A deadline that had already passed
/// before the pause began is left untouched; a breached deadline is never
/// extended. Fails with `NotPaused` if no open interval exists.
///
/// Returns the elapsed pause duration.
pub fn resume(record: &mut DeadlineRecord, now: DateTime<Utc>) -> Result<Duration> {
    let Some(open) = record.pause_intervals.iter_mut().find(|interval| interval.is_open()) else {
        return Err(DesklineError::NotPaused(record.ticket_id.to_string()));
    };

    let started_at = open.started_at;
    let elapsed = (now - started_at).max(Duration::zero());
    open.ended_at = Some(now);

    record.total_paused_minutes += elapsed.num_minutes();
    record.paused = false;

    if !record.response_breached && record.response_due_at > started_at {
        record.response_due_at += elapsed;
    }
    if !record.resolution_breached && record.resolution_due_at > started_at {
        record.resolution_due_at += elapsed;
    }

    Ok(elapsed)
}
