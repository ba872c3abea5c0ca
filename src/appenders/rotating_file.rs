//! Size-rotating log file
//!
//! [`RotatingFile`] owns the active file handle and the byte counter. When the
//! counter reaches the threshold the active file is retired under a
//! timestamped name (`app.log.20250108_103045.log`) and a fresh file is opened
//! at the configured path.

use crate::core::diagnostics::SharedDiagnostics;
use crate::core::error::{LoggerError, Result};
use crate::core::timestamp::{rotation_suffix, TimestampFormat};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// Rotating log file with a cumulative byte threshold
///
/// # Examples
///
/// ```no_run
/// use rotating_logger::appenders::RotatingFile;
/// use rotating_logger::core::StderrSink;
/// use std::sync::Arc;
///
/// // Rotate every 10 MB
/// let file = RotatingFile::open("/var/log/app.log", 10 * 1024 * 1024, Arc::new(StderrSink)).unwrap();
/// assert_eq!(file.bytes_since_rotation(), 0);
/// ```
pub struct RotatingFile {
    base_path: PathBuf,
    max_bytes: u64,
    writer: Option<LineWriter<File>>,
    /// Rendered bytes (plus one per line terminator) since the last rotation
    bytes_since_rotation: u64,
    timestamp_format: TimestampFormat,
    diagnostics: SharedDiagnostics,
}

impl RotatingFile {
    /// Open the log file, retiring any file already present at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened
    pub fn open<P: AsRef<Path>>(
        path: P,
        max_bytes: u64,
        diagnostics: SharedDiagnostics,
    ) -> Result<Self> {
        let mut file = Self {
            base_path: path.as_ref().to_path_buf(),
            max_bytes,
            writer: None,
            bytes_since_rotation: 0,
            timestamp_format: TimestampFormat::default(),
            diagnostics,
        };
        file.rotate()?;
        Ok(file)
    }

    /// Set the timestamp format used for the line prefix
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Retire the active file and open a fresh one at the configured path
    ///
    /// Directory creation and the retirement rename are best-effort: their
    /// failures go to the diagnostic sink and rotation carries on.
    ///
    /// # Errors
    ///
    /// Returns error only if the new file cannot be opened
    pub fn rotate(&mut self) -> Result<()> {
        // Release the old handle before anything else touches the path
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                self.diagnostics.report(&LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                ));
            }
        }

        if let Some(parent) = self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                self.diagnostics.report(&LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                ));
            }
        }

        if self.base_path.exists() {
            let retired = self.retirement_path(&Local::now());
            if let Err(e) = fs::rename(&self.base_path, &retired) {
                self.diagnostics.report(&LoggerError::io_operation(
                    "retire log file",
                    format!(
                        "Failed to rename '{}' to '{}'",
                        self.base_path.display(),
                        retired.display()
                    ),
                    e,
                ));
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", self.base_path.display()),
                    e,
                )
            })?;

        self.writer = Some(LineWriter::new(file));
        self.bytes_since_rotation = 0;
        Ok(())
    }

    /// Name for the retired file: `<path>.<YYYYMMDD_HHMMSS>.log`
    ///
    /// A second rotation within the same second gets `_1`, `_2`, ... appended
    /// to the stamp instead of overwriting the earlier archive.
    fn retirement_path(&self, now: &DateTime<Local>) -> PathBuf {
        let stamp = rotation_suffix(now);
        let candidate = |suffix: &str| {
            let mut name = self.base_path.clone().into_os_string();
            name.push(format!(".{}.log", suffix));
            PathBuf::from(name)
        };

        let mut path = candidate(&stamp);
        let mut attempt = 1u32;
        while path.exists() {
            path = candidate(&format!("{}_{}", stamp, attempt));
            attempt += 1;
        }
        path
    }

    /// Append `<timestamp> <rendered>\n` to the active file
    ///
    /// Only the rendered text and its terminator count toward the threshold.
    ///
    /// # Errors
    ///
    /// Returns error if no file is open or the write fails
    pub fn write_line(&mut self, timestamp: &DateTime<Local>, rendered: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                "No active log file",
            )
        })?;

        let line = format!("{} {}\n", self.timestamp_format.format(timestamp), rendered);
        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;

        self.bytes_since_rotation += rendered.len() as u64 + 1;
        Ok(())
    }

    /// Whether the counter has reached the threshold
    #[must_use]
    pub fn needs_rotation(&self) -> bool {
        self.bytes_since_rotation >= self.max_bytes
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Flush and release the active file handle
    pub fn close(&mut self) -> Result<()> {
        let result = self.flush();
        self.writer = None;
        result
    }

    #[must_use]
    pub fn bytes_since_rotation(&self) -> u64 {
        self.bytes_since_rotation
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}
