//! Construction parameters for a logger
//!
//! Loading these values from a file or the command line is the caller's
//! concern; [`LoggerConfig`] only deserializes and validates them.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default capacity of the entry queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 2000;

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

/// # Example
///
/// ```
/// use rotating_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::from_json_str(
///     r#"{"path": "logs/app.log", "min_level": "INFO", "max_size_mb": 10, "console": false}"#,
/// ).unwrap();
/// assert_eq!(config.min_level, LogLevel::Info);
/// assert_eq!(config.max_bytes(), 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Path of the active log file
    pub path: PathBuf,
    /// Minimum level accepted by the logger
    #[serde(default)]
    pub min_level: LogLevel,
    /// Rotation threshold in megabytes
    pub max_size_mb: u64,
    /// Echo entries to standard output
    #[serde(default)]
    pub console: bool,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
}

impl LoggerConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, min_level: LogLevel, max_size_mb: u64, console: bool) -> Self {
        Self {
            path: path.into(),
            min_level,
            max_size_mb,
            console,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timestamp_format: TimestampFormat::default(),
        }
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rotation threshold in bytes
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_destination()?;
        if self.max_size_mb == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "max_size_mb must be a positive number of megabytes",
            ));
        }
        Ok(())
    }

    /// Checks everything except the rotation threshold
    pub(crate) fn validate_destination(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "path must not be empty"));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "queue_capacity must be positive",
            ));
        }
        if !self.timestamp_format.is_valid() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "timestamp_format is not a valid strftime pattern",
            ));
        }
        Ok(())
    }
}
