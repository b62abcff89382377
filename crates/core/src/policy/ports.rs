//! Port interfaces for policy lookup
//!
//! These traits define the boundary between policy resolution and the
//! configuration store.

use async_trait::async_trait;
use deskline_domain::{Result, ScopeKey, SlaPolicy};

/// Trait for looking up configured SLA policies.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Find the active policy for a scope, if one is configured.
    ///
    /// At most one active policy exists per scope; the store enforces
    /// uniqueness.
    async fn find_active(&self, scope: &ScopeKey) -> Result<Option<SlaPolicy>>;
}
