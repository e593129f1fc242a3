//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub retention: RetentionConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Default row cap for history and transaction listings.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("taskloot").join("taskloot.db"))
        .unwrap_or_else(|| PathBuf::from(".taskloot/taskloot.db"))
}

fn default_history_limit() -> i64 {
    50
}

/// Retention window for archived tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Archived tasks older than this are eligible for purging.
    #[serde(default = "default_archive_days")]
    pub archive_days: i64,

    /// Expiry-reminder window for `expiring_archived_tasks`.
    #[serde(default = "default_warn_days")]
    pub warn_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            archive_days: default_archive_days(),
            warn_days: default_warn_days(),
        }
    }
}

fn default_archive_days() -> i64 {
    30
}

fn default_warn_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location or return defaults,
    /// with environment variable overrides applied on top.
    pub fn load_or_default() -> Self {
        let mut config = Self::load(".taskloot/config.yaml").unwrap_or_default();

        if let Ok(db_path) = std::env::var("TASKLOOT_DB_PATH") {
            config.store.db_path = PathBuf::from(db_path);
        }

        if let Ok(limit) = std::env::var("TASKLOOT_HISTORY_LIMIT")
            && let Ok(limit) = limit.parse()
        {
            config.store.history_limit = limit;
        }

        if let Ok(days) = std::env::var("TASKLOOT_ARCHIVE_DAYS")
            && let Ok(days) = days.parse()
        {
            config.retention.archive_days = days;
        }

        config
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.store.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
