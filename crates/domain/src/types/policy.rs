//! SLA policy types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority tier a ticket is classified into.
///
/// Used as the fallback key when no explicit policy is configured for a
/// ticket's exact scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    Urgent,
}

impl PriorityTier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid priority tier: {s}")),
        }
    }
}

/// Classification key a policy is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    /// Product the ticket was filed against
    pub product: String,
    /// Priority tier of the ticket
    pub tier: PriorityTier,
}

impl ScopeKey {
    /// Create a new scope key.
    pub fn new(product: impl Into<String>, tier: PriorityTier) -> Self {
        Self { product: product.into(), tier }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product, self.tier)
    }
}

/// An SLA policy: minute budgets for first response and resolution.
///
/// At most one active policy exists per scope key; uniqueness is enforced by
/// the resolver and the storage schema, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub id: Uuid,
    pub scope: ScopeKey,
    /// Minutes allowed before the first response
    pub response_minutes: i64,
    /// Minutes allowed before resolution
    pub resolution_minutes: i64,
    /// Whether the budgets elapse in business time rather than wall-clock
    pub business_hours_only: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl SlaPolicy {
    /// Create a new active policy with a fresh id.
    pub fn new(
        scope: ScopeKey,
        response_minutes: i64,
        resolution_minutes: i64,
        business_hours_only: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            response_minutes,
            resolution_minutes,
            business_hours_only,
            active: true,
            created_at,
        }
    }
}
