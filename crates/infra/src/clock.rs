//! System clock implementation

use chrono::{DateTime, Utc};
use deskline_core::Clock;

/// Wall-clock implementation of the [`Clock`] port.
///
/// The only place in the workspace that reads `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
