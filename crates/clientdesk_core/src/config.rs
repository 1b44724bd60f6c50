//! Environment-driven runtime configuration.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, LoggingConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CLIENTDESK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CLIENTDESK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CLIENTDESK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "clientdesk.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rotating log file directory; stderr when `None`.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(value) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps variable names to
    /// raw values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV).map_or_else(
            || std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            PathBuf::from,
        );
        let log_level = read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = match read(LOG_DIR_ENV) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(value));
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}
