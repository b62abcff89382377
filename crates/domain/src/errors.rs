//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Deskline
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DesklineError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ticket {0} is already paused")]
    AlreadyPaused(String),

    #[error("Ticket {0} is not paused")]
    NotPaused(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Deskline operations
pub type Result<T> = std::result::Result<T, DesklineError>;
