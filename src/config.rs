//! Runtime configuration
//!
//! Resolution order: built-in defaults, then environment variables, then
//! whatever the caller overrides (the CLI applies its flags last).
//!
//! # Environment
//! - `READING_TRACKER_DB`: path to the SQLite file
//! - `DATABASE_URL`: `sqlite://` URL, used when `READING_TRACKER_DB` is unset
//! - `READING_TRACKER_PAGE_SIZE`: default `limit` for listings (1-100)

use crate::error::{Result, TrackerError};
use crate::reading::input::MAX_PAGE_SIZE;
use crate::storage::Database;
use std::path::PathBuf;

pub const ENV_DATABASE_PATH: &str = "READING_TRACKER_DB";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_PAGE_SIZE: &str = "READING_TRACKER_PAGE_SIZE";

/// Settings needed to open the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    /// Listing `limit` used when a request gives none
    pub default_page_size: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: Database::get_default_path(),
            default_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.is_empty()) {
            config.database_path = PathBuf::from(path);
        } else if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.is_empty()) {
            config.database_path = path_from_sqlite_url(&url)?;
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE).filter(|v| !v.is_empty()) {
            config.default_page_size = parse_page_size(&raw)?;
        }

        Ok(config)
    }

    pub fn with_database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = path.into();
        self
    }
}

/// Extract the file path from `sqlite:///relative.db`, `sqlite://path` or `sqlite:path`
fn path_from_sqlite_url(url: &str) -> Result<PathBuf> {
    let rest = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| {
            TrackerError::InvalidConfiguration(format!(
                "{} must be a sqlite URL, got '{}'",
                ENV_DATABASE_URL, url
            ))
        })?;

    // Drop connection parameters such as ?mode=rwc
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() {
        return Err(TrackerError::InvalidConfiguration(format!(
            "{} has no database path",
            ENV_DATABASE_URL
        )));
    }

    Ok(PathBuf::from(path))
}

fn parse_page_size(raw: &str) -> Result<i64> {
    let value: i64 = raw.trim().parse().map_err(|e| {
        TrackerError::InvalidConfiguration(format!("{} is not a number: {}", ENV_PAGE_SIZE, e))
    })?;

    if !(1..=MAX_PAGE_SIZE).contains(&value) {
        return Err(TrackerError::InvalidConfiguration(format!(
            "{} must be between 1 and {}",
            ENV_PAGE_SIZE, MAX_PAGE_SIZE
        )));
    }

    Ok(value)
}
