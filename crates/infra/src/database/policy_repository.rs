//! SLA policy repository implementation using SQLite

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use deskline_core::PolicyRepository as PolicyRepositoryPort;
use deskline_domain::{PriorityTier, Result as DomainResult, ScopeKey, SlaPolicy};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::task;
use uuid::Uuid;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed implementation of `PolicyRepository`
pub struct SqlitePolicyRepository {
    db: Arc<DbManager>,
}

impl SqlitePolicyRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a policy.
    ///
    /// The schema's partial unique index rejects a second active policy for
    /// the same scope; deactivate the old one first.
    pub async fn insert(&self, policy: &SlaPolicy) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let policy = policy.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO sla_policies (
                    id, product, tier, response_minutes, resolution_minutes,
                    business_hours_only, active, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    policy.id.to_string(),
                    policy.scope.product,
                    policy.scope.tier.to_string(),
                    policy.response_minutes,
                    policy.resolution_minutes,
                    policy.business_hours_only,
                    policy.active,
                    policy.created_at.timestamp(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Deactivate the active policy for a scope, if any.
    pub async fn deactivate(&self, scope: &ScopeKey) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let scope = scope.clone();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE sla_policies SET active = 0
                     WHERE product = ?1 AND tier = ?2 AND active = 1",
                    params![scope.product, scope.tier.to_string()],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl PolicyRepositoryPort for SqlitePolicyRepository {
    async fn find_active(&self, scope: &ScopeKey) -> DomainResult<Option<SlaPolicy>> {
        let db = Arc::clone(&self.db);
        let scope = scope.clone();

        task::spawn_blocking(move || -> DomainResult<Option<SlaPolicy>> {
            let conn = db.get_connection()?;
            let result = conn.query_row(
                "SELECT id, product, tier, response_minutes, resolution_minutes,
                        business_hours_only, active, created_at
                 FROM sla_policies
                 WHERE product = ?1 AND tier = ?2 AND active = 1",
                params![scope.product, scope.tier.to_string()],
                map_policy_row,
            );
            match result {
                Ok(policy) => Ok(Some(policy)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to an SlaPolicy
fn map_policy_row(row: &Row<'_>) -> rusqlite::Result<SlaPolicy> {
    let id: String = row.get(0)?;
    let product: String = row.get(1)?;
    let tier: String = row.get(2)?;
    let created_ts: i64 = row.get(7)?;

    Ok(SlaPolicy {
        id: Uuid::parse_str(&id)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?,
        scope: ScopeKey {
            product,
            tier: PriorityTier::from_str(&tier).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    Type::Text,
                    err.into(),
                )
            })?,
        },
        response_minutes: row.get(3)?,
        resolution_minutes: row.get(4)?,
        business_hours_only: row.get(5)?,
        active: row.get(6)?,
        created_at: DateTime::from_timestamp(created_ts, 0)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(7, created_ts))?,
    })
}
