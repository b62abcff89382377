//! Domain types and models

pub mod calendar;
pub mod deadline;
pub mod events;
pub mod policy;

pub use calendar::{BusinessHoursRule, BusinessWeek, Holiday};
pub use deadline::{DeadlineRecord, DueDates, PauseInterval};
pub use events::{BreachEvent, BreachKind, TicketCreated, UpcomingBreachEvent};
pub use policy::{PriorityTier, ScopeKey, SlaPolicy};
