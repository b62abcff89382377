//! Policy resolver with built-in tier defaults
//!
//! The default minute budgets live here and nowhere else; call sites must
//! not embed their own copies.

use std::sync::Arc;

use chrono::DateTime;
use deskline_domain::{PriorityTier, Result, ScopeKey, SlaPolicy};
use tracing::info;
use uuid::Uuid;

use super::ports::PolicyRepository;

/// Built-in `(response, resolution)` minute budgets per tier.
fn default_budgets(tier: PriorityTier) -> (i64, i64) {
    match tier {
        PriorityTier::Low => (480, 2880),
        PriorityTier::Medium => (240, 1440),
        PriorityTier::High => (60, 480),
        PriorityTier::Urgent => (30, 240),
    }
}

/// Stable ids for the built-in defaults, so records created against a
/// fallback policy reference the same id on every resolution.
fn default_policy_id(tier: PriorityTier) -> Uuid {
    match tier {
        PriorityTier::Low => Uuid::from_u128(0xdead_1111),
        PriorityTier::Medium => Uuid::from_u128(0xdead_2222),
        PriorityTier::High => Uuid::from_u128(0xdead_3333),
        PriorityTier::Urgent => Uuid::from_u128(0xdead_4444),
    }
}

/// The built-in default policy for a scope's tier.
///
/// Always business-hours-only. The synthetic `created_at` marks the policy
/// as not operator-configured.
pub fn default_policy_for_tier(scope: &ScopeKey) -> SlaPolicy {
    let (response_minutes, resolution_minutes) = default_budgets(scope.tier);

    SlaPolicy {
        id: default_policy_id(scope.tier),
        scope: scope.clone(),
        response_minutes,
        resolution_minutes,
        business_hours_only: true,
        active: true,
        created_at: DateTime::UNIX_EPOCH,
    }
}

/// Resolves the applicable SLA policy for a ticket's scope.
///
/// Idempotent and side-effect-free: a missing configuration is resolved to
/// the built-in tier default and logged, never surfaced as an error.
pub struct PolicyResolver {
    repository: Arc<dyn PolicyRepository>,
}

impl PolicyResolver {
    /// Create a new resolver over the given policy store.
    pub fn new(repository: Arc<dyn PolicyRepository>) -> Self {
        Self { repository }
    }

    /// The active policy for `scope`, or the built-in tier default.
    pub async fn resolve(&self, scope: &ScopeKey) -> Result<SlaPolicy> {
        if let Some(policy) = self.repository.find_active(scope).await? {
            return Ok(policy);
        }
        info!(scope = %scope, tier = %scope.tier, "no active SLA policy for scope, using tier default");
        Ok(default_policy_for_tier(scope))
    }
}
