//! Integration tests for the SQLite repositories against a real database.

mod support;

use std::sync::Arc;

use deskline_core::{CalendarRepository, DeadlineRepository, PolicyRepository};
use deskline_domain::{
    BreachKind, DesklineError, Holiday, PauseInterval, PriorityTier, ScopeKey, SlaPolicy,
};
use deskline_infra::{SqliteCalendarRepository, SqliteDeadlineRepository, SqlitePolicyRepository};
use uuid::Uuid;

use support::{instant, migrated_db, office_week, record_due};

#[tokio::test]
async fn record_round_trips_with_pause_history() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(Arc::clone(&db));

    let mut record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    record.pause_intervals.push(PauseInterval {
        started_at: instant("2026-03-02T09:30:00Z"),
        ended_at: Some(instant("2026-03-02T09:50:00Z")),
        reason: "waiting on customer".into(),
    });
    record.total_paused_minutes = 20;

    repo.insert(&record).await.unwrap();
    let loaded = repo.find(record.ticket_id).await.unwrap().unwrap();

    assert_eq!(loaded.ticket_id, record.ticket_id);
    assert_eq!(loaded.response_due_at, record.response_due_at);
    assert_eq!(loaded.resolution_due_at, record.resolution_due_at);
    assert_eq!(loaded.pause_intervals, record.pause_intervals);
    assert_eq!(loaded.total_paused_minutes, 20);
    assert!(!loaded.paused);
}

#[tokio::test]
async fn find_returns_none_for_unknown_ticket() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    assert!(repo.find(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_rewrites_pause_history_transactionally() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let mut record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&record).await.unwrap();

    record.paused = true;
    record.pause_intervals.push(PauseInterval {
        started_at: instant("2026-03-02T10:00:00Z"),
        ended_at: None,
        reason: "vendor escalation".into(),
    });
    repo.update(&record).await.unwrap();

    let loaded = repo.find(record.ticket_id).await.unwrap().unwrap();
    assert!(loaded.paused);
    assert_eq!(loaded.pause_intervals.len(), 1);
    assert!(loaded.pause_intervals[0].is_open());
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    let err = repo.update(&record).await.unwrap_err();
    assert!(matches!(err, DesklineError::NotFound(_)));
}

#[tokio::test]
async fn breach_flip_happens_exactly_once() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&record).await.unwrap();
    let now = instant("2026-03-02T12:00:00Z");

    let first = repo.mark_breached_if_pending(record.ticket_id, BreachKind::Response, now).await.unwrap();
    let second = repo.mark_breached_if_pending(record.ticket_id, BreachKind::Response, now).await.unwrap();

    assert!(first);
    assert!(!second);
    let loaded = repo.find(record.ticket_id).await.unwrap().unwrap();
    assert!(loaded.response_breached);
    assert!(!loaded.resolution_breached);
}

#[tokio::test]
async fn breach_flip_respects_the_guards() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);
    let now = instant("2026-03-02T12:00:00Z");

    // Not yet due
    let early = record_due("2026-03-02T13:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&early).await.unwrap();
    assert!(!repo.mark_breached_if_pending(early.ticket_id, BreachKind::Response, now).await.unwrap());

    // Paused
    let mut paused = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    paused.paused = true;
    repo.insert(&paused).await.unwrap();
    assert!(!repo.mark_breached_if_pending(paused.ticket_id, BreachKind::Response, now).await.unwrap());

    // Already responded
    let mut responded = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    responded.first_response_at = Some(instant("2026-03-02T10:00:00Z"));
    repo.insert(&responded).await.unwrap();
    assert!(!repo
        .mark_breached_if_pending(responded.ticket_id, BreachKind::Response, now)
        .await
        .unwrap());
}

#[tokio::test]
async fn overdue_query_filters_to_live_clocks() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);
    let now = instant("2026-03-02T12:00:00Z");

    let overdue = record_due("2026-03-02T11:00:00Z", "2026-03-03T15:00:00Z");
    let future = record_due("2026-03-02T14:00:00Z", "2026-03-03T15:00:00Z");
    let mut paused = record_due("2026-03-02T10:00:00Z", "2026-03-03T15:00:00Z");
    paused.paused = true;

    repo.insert(&overdue).await.unwrap();
    repo.insert(&future).await.unwrap();
    repo.insert(&paused).await.unwrap();

    let candidates = repo.find_overdue(BreachKind::Response, now).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].ticket_id, overdue.ticket_id);
}

#[tokio::test]
async fn due_within_window_query_is_inclusive() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let at_edge = record_due("2026-03-02T13:00:00Z", "2026-03-03T15:00:00Z");
    let outside = record_due("2026-03-02T13:00:01Z", "2026-03-03T15:00:00Z");
    repo.insert(&at_edge).await.unwrap();
    repo.insert(&outside).await.unwrap();

    let hits = repo
        .find_due_within(
            BreachKind::Response,
            instant("2026-03-02T12:00:00Z"),
            instant("2026-03-02T13:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ticket_id, at_edge.ticket_id);
}

#[tokio::test]
async fn late_first_response_flips_breach_in_one_write() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&record).await.unwrap();

    let write = repo
        .set_first_response(record.ticket_id, instant("2026-03-02T11:30:00Z"))
        .await
        .unwrap()
        .unwrap();

    assert!(write.breach_flipped);
    assert_eq!(write.due_at, instant("2026-03-02T11:00:00Z"));

    let loaded = repo.find(record.ticket_id).await.unwrap().unwrap();
    assert!(loaded.response_breached);
    assert_eq!(loaded.first_response_at, Some(instant("2026-03-02T11:30:00Z")));
}

#[tokio::test]
async fn first_response_at_exactly_the_due_instant_is_not_late() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&record).await.unwrap();

    let write = repo
        .set_first_response(record.ticket_id, instant("2026-03-02T11:00:00Z"))
        .await
        .unwrap()
        .unwrap();

    assert!(!write.breach_flipped);
    assert!(!repo.find(record.ticket_id).await.unwrap().unwrap().response_breached);
}

#[tokio::test]
async fn completion_writes_are_first_write_wins() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let record = record_due("2026-03-02T11:00:00Z", "2026-03-02T15:00:00Z");
    repo.insert(&record).await.unwrap();

    let first = repo
        .set_resolved(record.ticket_id, instant("2026-03-02T14:00:00Z"))
        .await
        .unwrap();
    let replay = repo
        .set_resolved(record.ticket_id, instant("2026-03-02T16:00:00Z"))
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(replay.is_none());
    let loaded = repo.find(record.ticket_id).await.unwrap().unwrap();
    assert_eq!(loaded.resolved_at, Some(instant("2026-03-02T14:00:00Z")));
    assert!(!loaded.resolution_breached);
}

#[tokio::test]
async fn completion_write_for_missing_ticket_is_not_found() {
    let (db, _guard) = migrated_db();
    let repo = SqliteDeadlineRepository::new(db);

    let err = repo
        .set_first_response(Uuid::new_v4(), instant("2026-03-02T11:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, DesklineError::NotFound(_)));
}

#[tokio::test]
async fn policy_round_trip_and_uniqueness() {
    let (db, _guard) = migrated_db();
    let repo = SqlitePolicyRepository::new(db);

    let scope = ScopeKey::new("helpdesk", PriorityTier::High);
    let policy = SlaPolicy::new(scope.clone(), 60, 480, true, instant("2026-01-01T00:00:00Z"));
    repo.insert(&policy).await.unwrap();

    let found = repo.find_active(&scope).await.unwrap().unwrap();
    assert_eq!(found.id, policy.id);
    assert_eq!(found.response_minutes, 60);
    assert_eq!(found.scope, scope);

    // A second active policy for the same scope violates the partial index
    let duplicate = SlaPolicy::new(scope.clone(), 30, 240, true, instant("2026-01-02T00:00:00Z"));
    assert!(repo.insert(&duplicate).await.is_err());

    // Deactivating clears the way
    assert!(repo.deactivate(&scope).await.unwrap());
    assert!(repo.find_active(&scope).await.unwrap().is_none());
    repo.insert(&duplicate).await.unwrap();
    assert_eq!(repo.find_active(&scope).await.unwrap().unwrap().id, duplicate.id);
}

#[tokio::test]
async fn calendar_configuration_round_trips() {
    let (db, _guard) = migrated_db();
    let repo = SqliteCalendarRepository::new(db);

    repo.replace_week(&office_week()).await.unwrap();
    let holiday = Holiday {
        date: chrono::NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
        recurs_yearly: true,
        name: Some("Christmas".into()),
    };
    repo.add_holiday(&holiday).await.unwrap();

    let week = repo.business_week().await.unwrap();
    assert_eq!(week.rules().len(), 5);
    assert!(week.rule_for(chrono::Weekday::Wed).unwrap().is_working_day);
    assert!(week.rule_for(chrono::Weekday::Sat).is_none());

    let holidays = repo.holidays().await.unwrap();
    assert_eq!(holidays, vec![holiday]);
}

#[tokio::test]
async fn empty_calendar_tables_mean_no_schedule() {
    let (db, _guard) = migrated_db();
    let repo = SqliteCalendarRepository::new(db);

    let week = repo.business_week().await.unwrap();
    assert!(week.is_empty());
    assert!(repo.holidays().await.unwrap().is_empty());
}
