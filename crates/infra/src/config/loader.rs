//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DESKLINE_DB_PATH`: Database file path (required)
//! - `DESKLINE_DB_POOL_SIZE`: Connection pool size
//! - `DESKLINE_SWEEP_OVERDUE_CRON`: Overdue sweep cron expression
//! - `DESKLINE_SWEEP_UPCOMING_CRON`: Advisory sweep cron expression
//! - `DESKLINE_SWEEP_RECONCILE_CRON`: Reconciliation cron expression
//! - `DESKLINE_SWEEP_LOOKAHEAD_MINUTES`: Advisory lookahead window
//! - `DESKLINE_SWEEP_ENABLED`: Whether sweeps run (true/false)
//! - `DESKLINE_CALENDAR_SCAN_DAYS`: Forward scan bound for open windows
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./deskline.json` or `./deskline.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use deskline_domain::constants::DEFAULT_DB_POOL_SIZE;
use deskline_domain::{
    CalendarConfig, DatabaseConfig, DesklineError, EngineConfig, Result, SweepConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DesklineError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<EngineConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `DESKLINE_DB_PATH` is required; everything else has defaults.
///
/// # Errors
/// Returns `DesklineError::Config` if the required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<EngineConfig> {
    let db_path = env_var("DESKLINE_DB_PATH")?;
    let pool_size = env_parse("DESKLINE_DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE)?;

    let mut sweep = SweepConfig::default();
    if let Ok(cron) = std::env::var("DESKLINE_SWEEP_OVERDUE_CRON") {
        sweep.overdue_cron = cron;
    }
    if let Ok(cron) = std::env::var("DESKLINE_SWEEP_UPCOMING_CRON") {
        sweep.upcoming_cron = cron;
    }
    if let Ok(cron) = std::env::var("DESKLINE_SWEEP_RECONCILE_CRON") {
        sweep.reconcile_cron = cron;
    }
    sweep.lookahead_minutes =
        env_parse("DESKLINE_SWEEP_LOOKAHEAD_MINUTES", sweep.lookahead_minutes)?;
    sweep.enabled = env_bool("DESKLINE_SWEEP_ENABLED", sweep.enabled);

    let mut calendar = CalendarConfig::default();
    calendar.scan_days = env_parse("DESKLINE_CALENDAR_SCAN_DAYS", calendar.scan_days)?;

    Ok(EngineConfig {
        database: DatabaseConfig { path: db_path, pool_size },
        sweep,
        calendar,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `DesklineError::Config` if the file is missing or malformed.
pub fn load_from_file(path: Option<&Path>) -> Result<EngineConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            DesklineError::Config("no config file found in probed locations".into())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|err| {
        DesklineError::Config(format!("failed to read {}: {err}", path.display()))
    })?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str::<EngineConfig>(&contents).map_err(|err| {
            DesklineError::Config(format!("invalid JSON in {}: {err}", path.display()))
        })?,
        Some("toml") => toml::from_str::<EngineConfig>(&contents).map_err(|err| {
            DesklineError::Config(format!("invalid TOML in {}: {err}", path.display()))
        })?,
        _ => {
            return Err(DesklineError::Config(format!(
                "unsupported config format: {}",
                path.display()
            )))
        }
    };

    tracing::info!(path = %path.display(), "Configuration loaded from file");
    Ok(config)
}

/// Probe well-known locations for a config file.
fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for dir in [PathBuf::from("."), PathBuf::from("..")] {
        for name in ["config.json", "config.toml", "deskline.json", "deskline.toml"] {
            candidates.push(dir.join(name));
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            for name in ["config.json", "config.toml", "deskline.json", "deskline.toml"] {
                candidates.push(dir.join(name));
            }
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| DesklineError::Config(format!("missing environment variable {name}")))
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|err| DesklineError::Config(format!("invalid value for {name}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
