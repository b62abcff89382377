//! Per-ticket deadline state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single operator-initiated suspension of the SLA clock.
///
/// `ended_at` is unset while the pause is open. At most one open interval
/// exists per record; the pause controller enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub reason: String,
}

impl PauseInterval {
    /// Whether this interval has not been closed yet.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Computed pair of due dates for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDates {
    pub response_due_at: DateTime<Utc>,
    pub resolution_due_at: DateTime<Utc>,
}

/// The per-ticket mutable SLA state: due dates, breach flags and pause
/// bookkeeping.
///
/// Breach flags are monotonic (once true, never reset) and due dates only
/// move forward, via resume-driven extension. Mutation goes through the
/// pause controller and the deadline service; the record itself only offers
/// read helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineRecord {
    pub ticket_id: Uuid,
    pub policy_id: Uuid,
    pub response_due_at: DateTime<Utc>,
    pub resolution_due_at: DateTime<Utc>,
    pub first_response_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub response_breached: bool,
    pub resolution_breached: bool,
    pub paused: bool,
    /// Append-only pause history, oldest first
    pub pause_intervals: Vec<PauseInterval>,
    /// Sum of the durations of all closed intervals, in whole minutes
    pub total_paused_minutes: i64,
    pub created_at: DateTime<Utc>,
}

impl DeadlineRecord {
    /// Create a fresh record for a ticket from its computed due dates.
    pub fn new(
        ticket_id: Uuid,
        policy_id: Uuid,
        due_dates: DueDates,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket_id,
            policy_id,
            response_due_at: due_dates.response_due_at,
            resolution_due_at: due_dates.resolution_due_at,
            first_response_at: None,
            resolved_at: None,
            response_breached: false,
            resolution_breached: false,
            paused: false,
            pause_intervals: Vec::new(),
            total_paused_minutes: 0,
            created_at,
        }
    }

    /// The open pause interval, if the record is currently paused.
    pub fn open_pause(&self) -> Option<&PauseInterval> {
        self.pause_intervals.iter().find(|interval| interval.is_open())
    }

    /// Whether the response clock is still running: no first response yet
    /// and no breach flagged.
    pub fn response_pending(&self) -> bool {
        self.first_response_at.is_none() && !self.response_breached
    }

    /// Whether the resolution clock is still running.
    pub fn resolution_pending(&self) -> bool {
        self.resolved_at.is_none() && !self.resolution_breached
    }
}
