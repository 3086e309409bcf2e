use std::env;
use std::path::PathBuf;

use crate::error::{TrackError, TrackResult};
use crate::queries::calling_queries::DEFAULT_PAGE_SIZE;

pub const DEFAULT_DB_PATH: &str = ".data/calltrack.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings read from the environment, after loading `.env` if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub fn load() -> TrackResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> TrackResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = value("CALLTRACK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let log_level = value("CALLTRACK_LOG_LEVEL").unwrap_or(defaults.log_level);
        let page_size = match value("CALLTRACK_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    TrackError::Config(format!(
                        "CALLTRACK_PAGE_SIZE must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => defaults.page_size,
        };

        Ok(Self {
            db_path,
            log_level,
            page_size,
        })
    }
}
