//! Runtime configuration for Floodgate.
#![allow(dead_code)]

use std::path::PathBuf;

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Buffering threshold applied when none is configured, in milliseconds.
pub const DEFAULT_THRESHOLD_MS: i64 = 5000;

/// Trailing window for latency aggregates, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 1;

/// Get the Floodgate home directory (~/.floodgate).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".floodgate"))
}

/// Get the default governance database path.
pub fn default_db_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("governance.db"))
}

/// Explicit runtime configuration, passed into the CLI dispatcher.
///
/// Everything the commands need to know about their environment lives here;
/// there is no process-wide mutable state.
#[derive(Clone, Debug)]
pub struct Config {
    /// Version string reported by the `version` command.
    pub version: &'static str,

    /// Path to the SQLite governance database.
    pub db_path: PathBuf,

    /// Latency above this triggers buffering.
    pub threshold_ms: i64,

    /// Trailing window for latency aggregates.
    pub window_minutes: i64,
}

impl Config {
    /// Build the default configuration. Fails only when the home directory
    /// cannot be resolved.
    pub fn load() -> Result<Self> {
        Ok(Self {
            version: env!("CARGO_PKG_VERSION"),
            db_path: default_db_path()?,
            threshold_ms: DEFAULT_THRESHOLD_MS,
            window_minutes: DEFAULT_WINDOW_MINUTES,
        })
    }

    /// Override the database path (from the `--db` flag).
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.db_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();

        assert_eq!(config.threshold_ms, 5000);
        assert_eq!(config.window_minutes, 1);
        assert!(config.db_path.ends_with("governance.db"));
        assert!(!config.version.is_empty());
    }

    #[test]
    fn test_config_db_override() {
        let config = Config::load()
            .unwrap()
            .with_db_path(PathBuf::from("/tmp/other.db"));

        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
    }
}
