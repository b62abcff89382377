use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deskline_core::SlaEventSink;
use deskline_domain::{BreachEvent, DesklineError, Result, UpcomingBreachEvent};

/// In-memory sink that records every event it receives.
///
/// Can be switched into a failing mode to verify that sink errors never
/// undo committed breach flags.
#[derive(Default, Clone)]
pub struct RecordingEventSink {
    breaches: Arc<Mutex<Vec<BreachEvent>>>,
    upcoming: Arc<Mutex<Vec<UpcomingBreachEvent>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail.
    pub fn fail_deliveries(&self) {
        *self.failing.lock().expect("sink lock") = true;
    }

    pub fn breaches(&self) -> Vec<BreachEvent> {
        self.breaches.lock().expect("sink lock").clone()
    }

    pub fn upcoming(&self) -> Vec<UpcomingBreachEvent> {
        self.upcoming.lock().expect("sink lock").clone()
    }
}

#[async_trait]
impl SlaEventSink for RecordingEventSink {
    async fn breach_detected(&self, event: BreachEvent) -> Result<()> {
        if *self.failing.lock().expect("sink lock") {
            return Err(DesklineError::Internal("sink unavailable".into()));
        }
        self.breaches.lock().expect("sink lock").push(event);
        Ok(())
    }

    async fn breach_approaching(&self, event: UpcomingBreachEvent) -> Result<()> {
        if *self.failing.lock().expect("sink lock") {
            return Err(DesklineError::Internal("sink unavailable".into()));
        }
        self.upcoming.lock().expect("sink lock").push(event);
        Ok(())
    }
}
