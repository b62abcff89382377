//! Engine boundary events
//!
//! Inputs arrive from the ticketing application; outputs go to the
//! notification collaborator. The engine itself neither stores nor delivers
//! notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::policy::ScopeKey;

/// Which SLA clock an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachKind {
    Response,
    Resolution,
}

impl fmt::Display for BreachKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => write!(f, "response"),
            Self::Resolution => write!(f, "resolution"),
        }
    }
}

impl FromStr for BreachKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "response" => Ok(Self::Response),
            "resolution" => Ok(Self::Resolution),
            _ => Err(format!("Invalid breach kind: {s}")),
        }
    }
}

/// Input event: a ticket was created and needs SLA tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreated {
    pub ticket_id: Uuid,
    pub scope: ScopeKey,
    pub created_at: DateTime<Utc>,
}

/// Output event: a deadline passed without its completion event.
///
/// Emitted exactly once per (ticket, kind) by the breach sweep or by a late
/// completion write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachEvent {
    pub ticket_id: Uuid,
    pub kind: BreachKind,
    pub due_at: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
}

/// Advisory output event: a deadline falls inside the lookahead window.
///
/// Repeated sweeps may legitimately re-report the same upcoming breach;
/// delivery dedup is the notification collaborator's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingBreachEvent {
    pub ticket_id: Uuid,
    pub kind: BreachKind,
    pub due_at: DateTime<Utc>,
}
