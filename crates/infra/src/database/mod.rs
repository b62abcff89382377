//! SQLite persistence for the SLA engine

mod calendar_repository;
mod deadline_repository;
mod manager;
mod policy_repository;

pub use calendar_repository::SqliteCalendarRepository;
pub use deadline_repository::SqliteDeadlineRepository;
pub use manager::{DbConnection, DbManager};
pub use policy_repository::SqlitePolicyRepository;
