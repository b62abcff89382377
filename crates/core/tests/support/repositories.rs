//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the core repository ports, enabling
//! deterministic tests without database dependencies. The deadline mock
//! reproduces the conditional-update semantics the real store provides, so
//! race-sensitive sweep tests behave like production.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskline_core::{CalendarRepository, CompletionWrite, DeadlineRepository, PolicyRepository};
use deskline_domain::{
    BreachKind, BusinessWeek, DeadlineRecord, DesklineError, Holiday, Result as DomainResult,
    ScopeKey, SlaPolicy,
};
use uuid::Uuid;

/// In-memory mock for `PolicyRepository`.
#[derive(Default, Clone)]
pub struct MockPolicyRepository {
    policies: Arc<Mutex<Vec<SlaPolicy>>>,
}

impl MockPolicyRepository {
    /// Create an empty mock (every lookup falls back to tier defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience helper for adding a policy to the mock.
    pub fn with_policy(self, policy: SlaPolicy) -> Self {
        self.policies.lock().expect("policy lock").push(policy);
        self
    }
}

#[async_trait]
impl PolicyRepository for MockPolicyRepository {
    async fn find_active(&self, scope: &ScopeKey) -> DomainResult<Option<SlaPolicy>> {
        Ok(self
            .policies
            .lock()
            .expect("policy lock")
            .iter()
            .find(|policy| policy.active && policy.scope == *scope)
            .cloned())
    }
}

/// In-memory mock for `CalendarRepository`.
#[derive(Clone)]
pub struct MockCalendarRepository {
    week: BusinessWeek,
    holidays: Vec<Holiday>,
}

impl MockCalendarRepository {
    pub fn new(week: BusinessWeek, holidays: Vec<Holiday>) -> Self {
        Self { week, holidays }
    }

    /// A calendar with no rules at all (wall-clock semantics).
    pub fn unconfigured() -> Self {
        Self { week: BusinessWeek::empty(), holidays: Vec::new() }
    }
}

#[async_trait]
impl CalendarRepository for MockCalendarRepository {
    async fn business_week(&self) -> DomainResult<BusinessWeek> {
        Ok(self.week.clone())
    }

    async fn holidays(&self) -> DomainResult<Vec<Holiday>> {
        Ok(self.holidays.clone())
    }
}

/// In-memory mock for `DeadlineRepository`.
///
/// Mirrors the store's conditional updates: breach flips and completion
/// writes re-check record state inside the same locked section.
#[derive(Default, Clone)]
pub struct MockDeadlineRepository {
    records: Arc<Mutex<HashMap<Uuid, DeadlineRecord>>>,
    failing: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockDeadlineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience helper for seeding a record.
    pub fn with_record(self, record: DeadlineRecord) -> Self {
        self.records.lock().expect("record lock").insert(record.ticket_id, record);
        self
    }

    /// Make every write against the given ticket fail, simulating a
    /// transient persistence error for sweep-isolation tests.
    pub fn fail_writes_for(&self, ticket_id: Uuid) {
        self.failing.lock().expect("record lock").insert(ticket_id);
    }

    /// Lift all injected failures.
    pub fn clear_failures(&self) {
        self.failing.lock().expect("record lock").clear();
    }

    /// Snapshot of a stored record.
    pub fn get(&self, ticket_id: Uuid) -> Option<DeadlineRecord> {
        self.records.lock().expect("record lock").get(&ticket_id).cloned()
    }

    fn check_failing(&self, ticket_id: Uuid) -> DomainResult<()> {
        if self.failing.lock().expect("record lock").contains(&ticket_id) {
            return Err(DesklineError::Database(format!("injected failure for {ticket_id}")));
        }
        Ok(())
    }
}

fn due_for(record: &DeadlineRecord, kind: BreachKind) -> DateTime<Utc> {
    match kind {
        BreachKind::Response => record.response_due_at,
        BreachKind::Resolution => record.resolution_due_at,
    }
}

fn clock_pending(record: &DeadlineRecord, kind: BreachKind) -> bool {
    match kind {
        BreachKind::Response => record.response_pending(),
        BreachKind::Resolution => record.resolution_pending(),
    }
}

#[async_trait]
impl DeadlineRepository for MockDeadlineRepository {
    async fn find(&self, ticket_id: Uuid) -> DomainResult<Option<DeadlineRecord>> {
        Ok(self.records.lock().expect("record lock").get(&ticket_id).cloned())
    }

    async fn insert(&self, record: &DeadlineRecord) -> DomainResult<()> {
        self.check_failing(record.ticket_id)?;
        self.records.lock().expect("record lock").insert(record.ticket_id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &DeadlineRecord) -> DomainResult<()> {
        self.check_failing(record.ticket_id)?;
        let mut records = self.records.lock().expect("record lock");
        if !records.contains_key(&record.ticket_id) {
            return Err(DesklineError::NotFound(format!(
                "no deadline record for ticket {}",
                record.ticket_id
            )));
        }
        records.insert(record.ticket_id, record.clone());
        Ok(())
    }

    async fn find_overdue(
        &self,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<DeadlineRecord>> {
        Ok(self
            .records
            .lock()
            .expect("record lock")
            .values()
            .filter(|record| {
                !record.paused && clock_pending(record, kind) && due_for(record, kind) < now
            })
            .cloned()
            .collect())
    }

    async fn find_due_within(
        &self,
        kind: BreachKind,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DomainResult<Vec<DeadlineRecord>> {
        Ok(self
            .records
            .lock()
            .expect("record lock")
            .values()
            .filter(|record| {
                let due = due_for(record, kind);
                !record.paused && clock_pending(record, kind) && due >= from && due <= until
            })
            .cloned()
            .collect())
    }

    async fn find_with_pending_clocks(&self) -> DomainResult<Vec<DeadlineRecord>> {
        Ok(self
            .records
            .lock()
            .expect("record lock")
            .values()
            .filter(|record| record.response_pending() || record.resolution_pending())
            .cloned()
            .collect())
    }

    async fn mark_breached_if_pending(
        &self,
        ticket_id: Uuid,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.check_failing(ticket_id)?;
        let mut records = self.records.lock().expect("record lock");
        let Some(record) = records.get_mut(&ticket_id) else {
            return Ok(false);
        };
        if record.paused || !clock_pending(record, kind) || due_for(record, kind) >= now {
            return Ok(false);
        }
        match kind {
            BreachKind::Response => record.response_breached = true,
            BreachKind::Resolution => record.resolution_breached = true,
        }
        Ok(true)
    }

    async fn set_first_response(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<CompletionWrite>> {
        self.check_failing(ticket_id)?;
        let mut records = self.records.lock().expect("record lock");
        let record = records.get_mut(&ticket_id).ok_or_else(|| {
            DesklineError::NotFound(format!("no deadline record for ticket {ticket_id}"))
        })?;
        if record.first_response_at.is_some() {
            return Ok(None);
        }
        record.first_response_at = Some(at);
        let breach_flipped = !record.response_breached && at > record.response_due_at;
        if breach_flipped {
            record.response_breached = true;
        }
        Ok(Some(CompletionWrite { due_at: record.response_due_at, breach_flipped }))
    }

    async fn set_resolved(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<CompletionWrite>> {
        self.check_failing(ticket_id)?;
        let mut records = self.records.lock().expect("record lock");
        let record = records.get_mut(&ticket_id).ok_or_else(|| {
            DesklineError::NotFound(format!("no deadline record for ticket {ticket_id}"))
        })?;
        if record.resolved_at.is_some() {
            return Ok(None);
        }
        record.resolved_at = Some(at);
        let breach_flipped = !record.resolution_breached && at > record.resolution_due_at;
        if breach_flipped {
            record.resolution_breached = true;
        }
        Ok(Some(CompletionWrite { due_at: record.resolution_due_at, breach_flipped }))
    }
}
