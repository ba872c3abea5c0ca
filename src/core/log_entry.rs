//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::Serialize;

/// One accepted message, immutable once created
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    level: LogLevel,
    message: String,
    timestamp: DateTime<Local>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so every entry lands on exactly one line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self::at(level, message, Local::now())
    }

    /// Create an entry with an explicit creation time
    pub fn at(level: LogLevel, message: impl AsRef<str>, timestamp: DateTime<Local>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    /// `[LEVEL] message`, without the timestamp prefix the file writer adds
    pub fn render(&self) -> String {
        format!("[{}] {}", self.level.to_str(), self.message)
    }
}
