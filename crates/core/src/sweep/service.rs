//! Breach sweeper implementation

use std::sync::Arc;

use chrono::Duration;
use deskline_domain::{
    BreachEvent, BreachKind, DeadlineRecord, DesklineError, Result, UpcomingBreachEvent,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::deadline::ports::{DeadlineRepository, SlaEventSink};

/// A per-record failure collected during a sweep.
#[derive(Debug)]
pub struct SweepFailure {
    pub ticket_id: Uuid,
    pub error: DesklineError,
}

/// Aggregate outcome of a sweep pass.
///
/// Per-record persistence failures end up in `failures` and never abort the
/// sweep for other records; the scheduler surfaces them to the operator.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub events: Vec<BreachEvent>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Whether every record was processed cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Detects overdue and soon-due deadline records.
pub struct BreachSweeper {
    deadlines: Arc<dyn DeadlineRepository>,
    events: Arc<dyn SlaEventSink>,
    clock: Arc<dyn Clock>,
}

impl BreachSweeper {
    /// Create a new sweeper.
    pub fn new(
        deadlines: Arc<dyn DeadlineRepository>,
        events: Arc<dyn SlaEventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { deadlines, events, clock }
    }

    /// Flag every overdue, non-paused, not-yet-breached record as breached,
    /// exactly once, and emit a breach event per flip.
    ///
    /// The flag transition is a conditional update in the repository, so a
    /// concurrent sweep (or a completion write racing this one) makes the
    /// flip fail silently here instead of double-reporting.
    #[instrument(skip(self))]
    pub async fn sweep_overdue(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for kind in [BreachKind::Response, BreachKind::Resolution] {
            let candidates = self.deadlines.find_overdue(kind, now).await?;
            debug!(kind = %kind, candidates = candidates.len(), "overdue sweep scanning");
            for record in candidates {
                self.flag_record(&record, kind, &mut report).await;
            }
        }

        info!(
            breaches = report.events.len(),
            failures = report.failures.len(),
            "overdue sweep finished"
        );
        Ok(report)
    }

    /// Advisory scan: records whose live deadline falls within `lookahead`
    /// from now. Read-only; repeated invocations may re-report the same
    /// upcoming breach.
    #[instrument(skip(self))]
    pub async fn sweep_upcoming(&self, lookahead: Duration) -> Result<Vec<UpcomingBreachEvent>> {
        let now = self.clock.now();
        let until = now + lookahead;
        let mut upcoming = Vec::new();

        for kind in [BreachKind::Response, BreachKind::Resolution] {
            for record in self.deadlines.find_due_within(kind, now, until).await? {
                let event = UpcomingBreachEvent {
                    ticket_id: record.ticket_id,
                    kind,
                    due_at: due_for(&record, kind),
                };
                if let Err(err) = self.events.breach_approaching(event.clone()).await {
                    warn!(ticket_id = %event.ticket_id, error = %err, "failed to hand advisory event to sink");
                }
                upcoming.push(event);
            }
        }

        info!(upcoming = upcoming.len(), lookahead_minutes = lookahead.num_minutes(), "advisory sweep finished");
        Ok(upcoming)
    }

    /// Full reconciliation pass: applies the overdue rule to every record
    /// with a pending clock, not just the indexed due-before-now
    /// candidates. Catches records a failed earlier sweep skipped; the
    /// conditional update keeps the exactly-once guarantee.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for record in self.deadlines.find_with_pending_clocks().await? {
            if record.paused {
                continue;
            }
            if record.response_pending() && record.response_due_at < now {
                self.flag_record(&record, BreachKind::Response, &mut report).await;
            }
            if record.resolution_pending() && record.resolution_due_at < now {
                self.flag_record(&record, BreachKind::Resolution, &mut report).await;
            }
        }

        info!(
            breaches = report.events.len(),
            failures = report.failures.len(),
            "reconciliation pass finished"
        );
        Ok(report)
    }

    async fn flag_record(&self, record: &DeadlineRecord, kind: BreachKind, report: &mut SweepReport) {
        let now = self.clock.now();
        match self.deadlines.mark_breached_if_pending(record.ticket_id, kind, now).await {
            Ok(true) => {
                let event = BreachEvent {
                    ticket_id: record.ticket_id,
                    kind,
                    due_at: due_for(record, kind),
                    detected_at: now,
                };
                // Flag is committed; sink failures are logged, never undone
                if let Err(err) = self.events.breach_detected(event.clone()).await {
                    warn!(ticket_id = %event.ticket_id, kind = %kind, error = %err, "failed to hand breach event to sink");
                }
                report.events.push(event);
            }
            Ok(false) => {
                debug!(ticket_id = %record.ticket_id, kind = %kind, "breach flip lost the race, skipping");
            }
            Err(error) => {
                warn!(ticket_id = %record.ticket_id, kind = %kind, error = %error, "sweep failed for record");
                report.failures.push(SweepFailure { ticket_id: record.ticket_id, error });
            }
        }
    }
}

fn due_for(record: &DeadlineRecord, kind: BreachKind) -> chrono::DateTime<chrono::Utc> {
    match kind {
        BreachKind::Response => record.response_due_at,
        BreachKind::Resolution => record.resolution_due_at,
    }
}
