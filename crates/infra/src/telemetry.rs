//! Tracing subscriber setup
//!
//! The host application calls [`init_tracing`] once at startup; tests and
//! embedded uses are free to install their own subscriber instead.

use deskline_domain::{DesklineError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, defaulting to `info`.
///
/// # Errors
/// Returns `DesklineError::Config` if a global subscriber is already
/// installed.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| DesklineError::Config(format!("failed to init tracing: {err}")))
}
