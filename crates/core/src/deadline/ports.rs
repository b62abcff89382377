//! Port interfaces for deadline tracking
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskline_domain::{
    BreachEvent, BreachKind, BusinessWeek, DeadlineRecord, Holiday, Result, UpcomingBreachEvent,
};
use uuid::Uuid;

/// Outcome of a completion-timestamp write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionWrite {
    /// The due date the completion was measured against
    pub due_at: DateTime<Utc>,
    /// Whether this write flipped the breach flag (completion was late and
    /// the flag was still false)
    pub breach_flipped: bool,
}

/// Trait for persisting per-ticket deadline state.
///
/// Implementations must serialize writes per record (single writer at a
/// time) and perform the flag transitions as conditional updates so that
/// concurrent sweeps and completion writes cannot double-report a breach.
#[async_trait]
pub trait DeadlineRepository: Send + Sync {
    /// Load the record for a ticket.
    async fn find(&self, ticket_id: Uuid) -> Result<Option<DeadlineRecord>>;

    /// Persist a freshly created record.
    async fn insert(&self, record: &DeadlineRecord) -> Result<()>;

    /// Persist the record and its pause history in one transaction.
    async fn update(&self, record: &DeadlineRecord) -> Result<()>;

    /// Records whose `kind` deadline has passed, the breach flag is still
    /// false, the completion timestamp is unset, and the clock is not
    /// paused.
    async fn find_overdue(
        &self,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<DeadlineRecord>>;

    /// Records whose `kind` deadline falls in `[from, until]` with the
    /// clock still live (unbreached, incomplete, not paused).
    async fn find_due_within(
        &self,
        kind: BreachKind,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DeadlineRecord>>;

    /// All records with at least one clock still pending, for the
    /// reconciliation pass.
    async fn find_with_pending_clocks(&self) -> Result<Vec<DeadlineRecord>>;

    /// Set the breach flag for `kind` if - and only if - the record is
    /// still unbreached, unpaused, incomplete and overdue at `now`, as a
    /// single conditional update.
    ///
    /// Returns whether the flag flipped. `false` means another writer got
    /// there first or the record's state changed; the caller must not emit
    /// an event.
    async fn mark_breached_if_pending(
        &self,
        ticket_id: Uuid,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Record the first response timestamp, flipping the response breach
    /// flag in the same write when `at` is past the due date.
    ///
    /// First write wins: returns `Ok(None)` if a first response was already
    /// recorded. Fails with `NotFound` if the ticket has no record.
    async fn set_first_response(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<CompletionWrite>>;

    /// Record the resolution timestamp; same contract as
    /// [`Self::set_first_response`] for the resolution clock.
    async fn set_resolved(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<CompletionWrite>>;
}

/// Trait for reading the shared business calendar configuration.
///
/// Read-mostly: due dates are computed from a snapshot of these tables, so
/// admin edits never retroactively move already-computed deadlines.
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// The configured weekly schedule (validated, at most 7 rules).
    async fn business_week(&self) -> Result<BusinessWeek>;

    /// All configured holidays.
    async fn holidays(&self) -> Result<Vec<Holiday>>;
}

/// Trait for handing breach events to the notification collaborator.
///
/// Delivery is outside the engine; implementations forward or log. A sink
/// failure never un-flags a breach.
#[async_trait]
pub trait SlaEventSink: Send + Sync {
    /// A deadline was newly flagged as breached.
    async fn breach_detected(&self, event: BreachEvent) -> Result<()>;

    /// A deadline falls inside the advisory lookahead window.
    async fn breach_approaching(&self, event: UpcomingBreachEvent) -> Result<()>;
}
