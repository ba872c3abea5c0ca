//! Timestamp formatting utilities
//!
//! Log lines are prefixed with a local date/time stamp, and retired log
//! files carry a second-resolution suffix.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// strftime pattern used for retired file names: `20250108_103045`
pub const ROTATION_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp format used for the line prefix
///
/// # Examples
///
/// ```
/// use rotating_logger::core::TimestampFormat;
/// use chrono::Local;
///
/// let stamp = TimestampFormat::Standard.format(&Local::now());
/// // Output: "2025/01/08 10:30:45"
/// assert_eq!(stamp.len(), 19);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local date and time, second resolution: `2025/01/08 10:30:45`
    #[default]
    Standard,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+09:00`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456789+09:00`
    Rfc3339,

    /// Custom strftime format
    ///
    /// # Examples
    ///
    /// ```
    /// use rotating_logger::core::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Standard => datetime.format("%Y/%m/%d %H:%M:%S").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// False for a custom pattern chrono cannot format
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Custom(format_str) => {
                StrftimeItems::new(format_str).all(|item| !matches!(item, Item::Error))
            }
            _ => true,
        }
    }
}

/// Suffix stamped onto a retired log file
#[must_use]
pub fn rotation_suffix(datetime: &DateTime<Local>) -> String {
    datetime.format(ROTATION_SUFFIX_FORMAT).to_string()
}
