//! Business calendar configuration repository using SQLite
//!
//! Read-mostly shared configuration: the engine reads snapshots, the admin
//! surface writes through the replace/add helpers. Snapshots are validated
//! into a [`BusinessWeek`] on every read so a corrupted table surfaces as
//! an explicit error instead of silent mis-arithmetic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Weekday};
use deskline_core::CalendarRepository as CalendarRepositoryPort;
use deskline_domain::{BusinessHoursRule, BusinessWeek, Holiday, Result as DomainResult};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed implementation of `CalendarRepository`
pub struct SqliteCalendarRepository {
    db: Arc<DbManager>,
}

impl SqliteCalendarRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Replace the whole weekly schedule in one transaction.
    pub async fn replace_week(&self, week: &BusinessWeek) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let rules = week.rules().to_vec();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM business_hours_rules", []).map_err(map_sql_error)?;
            for rule in &rules {
                tx.execute(
                    "INSERT INTO business_hours_rules (weekday, is_working_day, start_time, end_time)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        rule.weekday.num_days_from_monday(),
                        rule.is_working_day,
                        rule.start.format(TIME_FORMAT).to_string(),
                        rule.end.format(TIME_FORMAT).to_string(),
                    ],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Add a holiday.
    pub async fn add_holiday(&self, holiday: &Holiday) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let holiday = holiday.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO holidays (date, recurs_yearly, name) VALUES (?1, ?2, ?3)",
                params![
                    holiday.date.format(DATE_FORMAT).to_string(),
                    holiday.recurs_yearly,
                    holiday.name,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl CalendarRepositoryPort for SqliteCalendarRepository {
    async fn business_week(&self) -> DomainResult<BusinessWeek> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<BusinessWeek> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT weekday, is_working_day, start_time, end_time
                     FROM business_hours_rules ORDER BY weekday",
                )
                .map_err(map_sql_error)?;
            let rules = stmt
                .query_map([], map_rule_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            BusinessWeek::new(rules)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn holidays(&self) -> DomainResult<Vec<Holiday>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Holiday>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT date, recurs_yearly, name FROM holidays ORDER BY date")
                .map_err(map_sql_error)?;
            let holidays = stmt
                .query_map([], map_holiday_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(holidays)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn map_rule_row(row: &Row<'_>) -> rusqlite::Result<BusinessHoursRule> {
    let weekday_num: i64 = row.get(0)?;
    let weekday = match weekday_num {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        6 => Weekday::Sun,
        other => return Err(rusqlite::Error::IntegralValueOutOfRange(0, other)),
    };

    Ok(BusinessHoursRule {
        weekday,
        is_working_day: row.get(1)?,
        start: column_time(row, 2)?,
        end: column_time(row, 3)?,
    })
}

fn map_holiday_row(row: &Row<'_>) -> rusqlite::Result<Holiday> {
    let date: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;

    Ok(Holiday { date, recurs_yearly: row.get(1)?, name: row.get(2)? })
}

fn column_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let value: String = row.get(idx)?;
    NaiveTime::parse_from_str(&value, TIME_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
