//! Deadline lifecycle: record creation, completion events, pause/resume

pub mod ports;
mod service;

pub use service::DeadlineService;
