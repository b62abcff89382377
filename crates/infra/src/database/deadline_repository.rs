//! Deadline record repository implementation using SQLite
//!
//! Persists each record together with its pause history in one transaction
//! and implements the breach flag flips as conditional updates, so
//! concurrent sweeps and completion writes cannot double-report a breach.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskline_core::{CompletionWrite, DeadlineRepository as DeadlineRepositoryPort};
use deskline_domain::{
    BreachKind, DeadlineRecord, DesklineError, PauseInterval, Result as DomainResult,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use tokio::task;
use uuid::Uuid;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed implementation of `DeadlineRepository`
pub struct SqliteDeadlineRepository {
    db: Arc<DbManager>,
}

impl SqliteDeadlineRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeadlineRepositoryPort for SqliteDeadlineRepository {
    async fn find(&self, ticket_id: Uuid) -> DomainResult<Option<DeadlineRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<DeadlineRecord>> {
            let conn = db.get_connection()?;
            query_record(&conn, ticket_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, record: &DeadlineRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;
            insert_record(&tx, &record).map_err(map_sql_error)?;
            replace_intervals(&tx, &record).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(&self, record: &DeadlineRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;
            let changed = update_record(&tx, &record).map_err(map_sql_error)?;
            if changed == 0 {
                return Err(DesklineError::NotFound(format!(
                    "no deadline record for ticket {}",
                    record.ticket_id
                )));
            }
            replace_intervals(&tx, &record).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_overdue(
        &self,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<DeadlineRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<DeadlineRecord>> {
            let conn = db.get_connection()?;
            let (due_col, breached_col, completed_col) = clock_columns(kind);
            let sql = format!(
                "{RECORD_SELECT} WHERE paused = 0 AND {breached_col} = 0
                 AND {completed_col} IS NULL AND {due_col} < ?1"
            );
            query_records(&conn, &sql, params![now.timestamp()])
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_due_within(
        &self,
        kind: BreachKind,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DomainResult<Vec<DeadlineRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<DeadlineRecord>> {
            let conn = db.get_connection()?;
            let (due_col, breached_col, completed_col) = clock_columns(kind);
            let sql = format!(
                "{RECORD_SELECT} WHERE paused = 0 AND {breached_col} = 0
                 AND {completed_col} IS NULL AND {due_col} >= ?1 AND {due_col} <= ?2"
            );
            query_records(&conn, &sql, params![from.timestamp(), until.timestamp()])
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_with_pending_clocks(&self) -> DomainResult<Vec<DeadlineRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<DeadlineRecord>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "{RECORD_SELECT} WHERE (response_breached = 0 AND first_response_at IS NULL)
                 OR (resolution_breached = 0 AND resolved_at IS NULL)"
            );
            query_records(&conn, &sql, params![])
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_breached_if_pending(
        &self,
        ticket_id: Uuid,
        kind: BreachKind,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let (due_col, breached_col, completed_col) = clock_columns(kind);
            // Single conditional update: the guard and the write are one
            // statement, so a concurrent sweep sees zero changed rows
            let sql = format!(
                "UPDATE deadline_records SET {breached_col} = 1
                 WHERE ticket_id = ?1 AND {breached_col} = 0 AND paused = 0
                 AND {completed_col} IS NULL AND {due_col} < ?2"
            );
            let changed = conn
                .execute(&sql, params![ticket_id.to_string(), now.timestamp()])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_first_response(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<CompletionWrite>> {
        self.set_completion(ticket_id, at, BreachKind::Response).await
    }

    async fn set_resolved(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<CompletionWrite>> {
        self.set_completion(ticket_id, at, BreachKind::Resolution).await
    }
}

impl SqliteDeadlineRepository {
    /// Shared first-response/resolution write: sets the completion
    /// timestamp once, flipping the breach flag in the same statement when
    /// the completion is late.
    async fn set_completion(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
        kind: BreachKind,
    ) -> DomainResult<Option<CompletionWrite>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<CompletionWrite>> {
            let mut conn = db.get_connection()?;
            let (due_col, breached_col, completed_col) = clock_columns(kind);

            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;

            let sql = format!(
                "SELECT {due_col}, {breached_col} FROM deadline_records WHERE ticket_id = ?1"
            );
            let (due_ts, breached): (i64, bool) = tx
                .query_row(&sql, params![ticket_id.to_string()], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .map_err(|err| match err {
                    rusqlite::Error::QueryReturnedNoRows => DesklineError::NotFound(format!(
                        "no deadline record for ticket {ticket_id}"
                    )),
                    other => map_sql_error(other),
                })?;

            let due_at = instant_from_ts(due_ts)?;
            let breach_flipped = !breached && at > due_at;

            let sql = format!(
                "UPDATE deadline_records
                 SET {completed_col} = ?2, {breached_col} = MAX({breached_col}, ?3)
                 WHERE ticket_id = ?1 AND {completed_col} IS NULL"
            );
            let changed = tx
                .execute(&sql, params![ticket_id.to_string(), at.timestamp(), breach_flipped])
                .map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;

            if changed == 0 {
                // First write wins; this one arrived second
                return Ok(None);
            }
            Ok(Some(CompletionWrite { due_at, breach_flipped }))
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

const RECORD_SELECT: &str = "SELECT ticket_id, policy_id, response_due_at, resolution_due_at,
        first_response_at, resolved_at, response_breached, resolution_breached,
        paused, total_paused_minutes, created_at
 FROM deadline_records";

/// The (due, breached, completed) column triple for a clock.
fn clock_columns(kind: BreachKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        BreachKind::Response => ("response_due_at", "response_breached", "first_response_at"),
        BreachKind::Resolution => ("resolution_due_at", "resolution_breached", "resolved_at"),
    }
}

fn instant_from_ts(ts: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| DesklineError::Database(format!("timestamp out of range: {ts}")))
}

fn column_instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ts: i64 = row.get(idx)?;
    DateTime::from_timestamp(ts, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ts))
}

fn column_optional_instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ts: Option<i64> = row.get(idx)?;
    ts.map(|ts| {
        DateTime::from_timestamp(ts, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ts))
    })
    .transpose()
}

fn column_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let value: String = row.get(idx)?;
    Uuid::parse_str(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Map a row to a DeadlineRecord (pause history loaded separately)
fn map_record_row(row: &Row<'_>) -> rusqlite::Result<DeadlineRecord> {
    Ok(DeadlineRecord {
        ticket_id: column_uuid(row, 0)?,
        policy_id: column_uuid(row, 1)?,
        response_due_at: column_instant(row, 2)?,
        resolution_due_at: column_instant(row, 3)?,
        first_response_at: column_optional_instant(row, 4)?,
        resolved_at: column_optional_instant(row, 5)?,
        response_breached: row.get(6)?,
        resolution_breached: row.get(7)?,
        paused: row.get(8)?,
        pause_intervals: Vec::new(),
        total_paused_minutes: row.get(9)?,
        created_at: column_instant(row, 10)?,
    })
}

fn query_record(conn: &Connection, ticket_id: Uuid) -> DomainResult<Option<DeadlineRecord>> {
    let sql = format!("{RECORD_SELECT} WHERE ticket_id = ?1");
    let result = conn.query_row(&sql, params![ticket_id.to_string()], map_record_row);
    match result {
        Ok(mut record) => {
            record.pause_intervals = load_intervals(conn, ticket_id).map_err(map_sql_error)?;
            Ok(Some(record))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(map_sql_error(err)),
    }
}

fn query_records(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> DomainResult<Vec<DeadlineRecord>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt
        .query_map(params, map_record_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;

    let mut records = Vec::with_capacity(rows.len());
    for mut record in rows {
        record.pause_intervals = load_intervals(conn, record.ticket_id).map_err(map_sql_error)?;
        records.push(record);
    }
    Ok(records)
}

fn load_intervals(conn: &Connection, ticket_id: Uuid) -> rusqlite::Result<Vec<PauseInterval>> {
    let mut stmt = conn.prepare(
        "SELECT started_at, ended_at, reason FROM pause_intervals
         WHERE ticket_id = ?1 ORDER BY started_at, id",
    )?;
    let intervals = stmt
        .query_map(params![ticket_id.to_string()], |row| {
            Ok(PauseInterval {
                started_at: column_instant(row, 0)?,
                ended_at: column_optional_instant(row, 1)?,
                reason: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(intervals)
}

fn insert_record(conn: &Connection, record: &DeadlineRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO deadline_records (
            ticket_id, policy_id, response_due_at, resolution_due_at,
            first_response_at, resolved_at, response_breached, resolution_breached,
            paused, total_paused_minutes, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.ticket_id.to_string(),
            record.policy_id.to_string(),
            record.response_due_at.timestamp(),
            record.resolution_due_at.timestamp(),
            record.first_response_at.map(|at| at.timestamp()),
            record.resolved_at.map(|at| at.timestamp()),
            record.response_breached,
            record.resolution_breached,
            record.paused,
            record.total_paused_minutes,
            record.created_at.timestamp(),
        ],
    )?;
    Ok(())
}

fn update_record(conn: &Connection, record: &DeadlineRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE deadline_records SET
            policy_id = ?2, response_due_at = ?3, resolution_due_at = ?4,
            first_response_at = ?5, resolved_at = ?6, response_breached = ?7,
            resolution_breached = ?8, paused = ?9, total_paused_minutes = ?10
         WHERE ticket_id = ?1",
        params![
            record.ticket_id.to_string(),
            record.policy_id.to_string(),
            record.response_due_at.timestamp(),
            record.resolution_due_at.timestamp(),
            record.first_response_at.map(|at| at.timestamp()),
            record.resolved_at.map(|at| at.timestamp()),
            record.response_breached,
            record.resolution_breached,
            record.paused,
            record.total_paused_minutes,
        ],
    )
}

/// Rewrite the pause history for a record inside the caller's transaction.
fn replace_intervals(conn: &Connection, record: &DeadlineRecord) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM pause_intervals WHERE ticket_id = ?1",
        params![record.ticket_id.to_string()],
    )?;
    for interval in &record.pause_intervals {
        conn.execute(
            "INSERT INTO pause_intervals (ticket_id, started_at, ended_at, reason)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.ticket_id.to_string(),
                interval.started_at.timestamp(),
                interval.ended_at.map(|at| at.timestamp()),
                interval.reason,
            ],
        )?;
    }
    Ok(())
}
