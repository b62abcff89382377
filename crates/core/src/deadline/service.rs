//! Deadline service - engine entry points for ticket lifecycle events

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deskline_domain::constants::CALENDAR_SCAN_DAYS;
use deskline_domain::{
    BreachEvent, BreachKind, DeadlineRecord, DesklineError, DueDates, Result, ScopeKey, SlaPolicy,
    TicketCreated,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ports::{CalendarRepository, CompletionWrite, DeadlineRepository, SlaEventSink};
use crate::calendar::{compute_due_dates, BusinessCalendar};
use crate::clock::Clock;
use crate::pause;
use crate::policy::PolicyResolver;

/// Orchestrates deadline records: creation on ticket events, completion
/// writes, pause/resume, and due date previews.
pub struct DeadlineService {
    deadlines: Arc<dyn DeadlineRepository>,
    calendars: Arc<dyn CalendarRepository>,
    resolver: PolicyResolver,
    events: Arc<dyn SlaEventSink>,
    clock: Arc<dyn Clock>,
    scan_days: i64,
}

impl DeadlineService {
    /// Create a new deadline service.
    pub fn new(
        deadlines: Arc<dyn DeadlineRepository>,
        calendars: Arc<dyn CalendarRepository>,
        resolver: PolicyResolver,
        events: Arc<dyn SlaEventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { deadlines, calendars, resolver, events, clock, scan_days: CALENDAR_SCAN_DAYS }
    }

    /// Override the calendar forward-scan bound (days), usually from
    /// `CalendarConfig::scan_days`.
    pub fn with_scan_days(mut self, scan_days: i64) -> Self {
        self.scan_days = scan_days;
        self
    }

    /// Handle a ticket-created event: resolve the policy, compute due
    /// dates, and persist a fresh record.
    ///
    /// Idempotent per ticket: an existing record is returned unchanged.
    pub async fn ticket_created(&self, event: TicketCreated) -> Result<DeadlineRecord> {
        if let Some(existing) = self.deadlines.find(event.ticket_id).await? {
            debug!(ticket_id = %event.ticket_id, "deadline record already exists, keeping it");
            return Ok(existing);
        }

        let record = self.build_record(event.ticket_id, &event.scope, event.created_at).await?;
        self.deadlines.insert(&record).await?;
        info!(
            ticket_id = %record.ticket_id,
            response_due_at = %record.response_due_at,
            resolution_due_at = %record.resolution_due_at,
            "deadline record created"
        );
        Ok(record)
    }

    /// Assign (or re-assign) an SLA to a ticket.
    ///
    /// With an existing record this is a no-op unless `force` is set - the
    /// path an operator takes when manually re-triggering "assign SLA".
    /// Forced recomputation re-resolves the policy and recomputes due dates
    /// from the ticket's creation instant, but never touches a clock that
    /// is already breached or completed.
    pub async fn assign_sla(
        &self,
        ticket_id: Uuid,
        scope: &ScopeKey,
        force: bool,
    ) -> Result<DeadlineRecord> {
        match self.deadlines.find(ticket_id).await? {
            None => {
                // Lazy creation on first access
                let record = self.build_record(ticket_id, scope, self.clock.now()).await?;
                self.deadlines.insert(&record).await?;
                Ok(record)
            }
            Some(record) if !force => Ok(record),
            Some(mut record) => {
                let policy = self.resolver.resolve(scope).await?;
                let due = self.compute(&policy, record.created_at).await?;
                record.policy_id = policy.id;
                if record.response_pending() {
                    record.response_due_at = due.response_due_at;
                }
                if record.resolution_pending() {
                    record.resolution_due_at = due.resolution_due_at;
                }
                self.deadlines.update(&record).await?;
                info!(ticket_id = %ticket_id, "SLA re-assigned on operator request");
                Ok(record)
            }
        }
    }

    /// Record the first response to a ticket.
    ///
    /// A late first response is itself a breach-detection trigger: the
    /// breach flag flips in the same write and the event is emitted here,
    /// independent of the sweep. Returns the emitted event, if any.
    pub async fn record_first_response(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<BreachEvent>> {
        let write = self.deadlines.set_first_response(ticket_id, at).await?;
        self.emit_if_flipped(ticket_id, BreachKind::Response, write).await
    }

    /// Record the resolution of a ticket; same late-detection contract as
    /// [`Self::record_first_response`].
    pub async fn record_resolution(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<BreachEvent>> {
        let write = self.deadlines.set_resolved(ticket_id, at).await?;
        self.emit_if_flipped(ticket_id, BreachKind::Resolution, write).await
    }

    /// Pause the SLA clock for a ticket.
    pub async fn pause_ticket(
        &self,
        ticket_id: Uuid,
        reason: impl Into<String> + Send,
    ) -> Result<DeadlineRecord> {
        let mut record = self.load(ticket_id).await?;
        pause::pause(&mut record, reason, self.clock.now())?;
        self.deadlines.update(&record).await?;
        info!(ticket_id = %ticket_id, "SLA clock paused");
        Ok(record)
    }

    /// Resume the SLA clock for a ticket, extending still-live deadlines by
    /// the elapsed pause duration.
    pub async fn resume_ticket(&self, ticket_id: Uuid) -> Result<DeadlineRecord> {
        let mut record = self.load(ticket_id).await?;
        let elapsed = pause::resume(&mut record, self.clock.now())?;
        self.deadlines.update(&record).await?;
        info!(
            ticket_id = %ticket_id,
            paused_minutes = elapsed.num_minutes(),
            "SLA clock resumed"
        );
        Ok(record)
    }

    /// Preview the due dates a ticket with the given scope would get if it
    /// started at `start_at`. Pure: nothing is persisted.
    pub async fn preview_due_dates(
        &self,
        scope: &ScopeKey,
        start_at: DateTime<Utc>,
    ) -> Result<DueDates> {
        let policy = self.resolver.resolve(scope).await?;
        self.compute(&policy, start_at).await
    }

    async fn load(&self, ticket_id: Uuid) -> Result<DeadlineRecord> {
        self.deadlines
            .find(ticket_id)
            .await?
            .ok_or_else(|| DesklineError::NotFound(format!("no deadline record for ticket {ticket_id}")))
    }

    async fn build_record(
        &self,
        ticket_id: Uuid,
        scope: &ScopeKey,
        created_at: DateTime<Utc>,
    ) -> Result<DeadlineRecord> {
        let policy = self.resolver.resolve(scope).await?;
        let due = self.compute(&policy, created_at).await?;
        Ok(DeadlineRecord::new(ticket_id, policy.id, due, created_at))
    }

    async fn compute(&self, policy: &SlaPolicy, start: DateTime<Utc>) -> Result<DueDates> {
        let week = self.calendars.business_week().await?;
        let holidays = self.calendars.holidays().await?;
        let calendar = BusinessCalendar::new(week, holidays).with_scan_days(self.scan_days);
        Ok(compute_due_dates(
            start,
            policy.response_minutes,
            policy.resolution_minutes,
            policy.business_hours_only,
            &calendar,
        ))
    }

    async fn emit_if_flipped(
        &self,
        ticket_id: Uuid,
        kind: BreachKind,
        write: Option<CompletionWrite>,
    ) -> Result<Option<BreachEvent>> {
        let Some(write) = write else {
            debug!(ticket_id = %ticket_id, kind = %kind, "completion already recorded, ignoring");
            return Ok(None);
        };
        if !write.breach_flipped {
            return Ok(None);
        }

        let event = BreachEvent {
            ticket_id,
            kind,
            due_at: write.due_at,
            detected_at: self.clock.now(),
        };
        // The flag is committed; a sink failure must not roll it back
        if let Err(err) = self.events.breach_detected(event.clone()).await {
            warn!(ticket_id = %ticket_id, kind = %kind, error = %err, "failed to hand breach event to sink");
        }
        Ok(Some(event))
    }
}
