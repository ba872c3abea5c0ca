//! Main logger implementation

use super::{
    config::LoggerConfig,
    diagnostics::{SharedDiagnostics, StderrSink},
    dispatcher::Dispatcher,
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    timestamp::TimestampFormat,
};
use crate::appenders::{ConsoleAppender, RotatingFile};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// Observable lifecycle of a [`Logger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Constructed, worker not started; emits are rejected
    Created,
    /// Worker running; emits are accepted
    Running,
    /// Closed; emits are rejected
    Closed,
}

enum Lifecycle {
    Created {
        sender: Sender<LogEntry>,
        receiver: Receiver<LogEntry>,
    },
    Running {
        sender: Sender<LogEntry>,
        worker: thread::JoinHandle<()>,
    },
    Closed,
}

impl Lifecycle {
    fn state(&self) -> LoggerState {
        match self {
            Lifecycle::Created { .. } => LoggerState::Created,
            Lifecycle::Running { .. } => LoggerState::Running,
            Lifecycle::Closed => LoggerState::Closed,
        }
    }
}

/// Asynchronous logger writing to a size-rotating file
///
/// # Example
///
/// ```no_run
/// use rotating_logger::prelude::*;
///
/// let logger = Logger::new("logs/app.log", LogLevel::Debug, 1, true)?;
/// logger.start_worker()?;
///
/// logger.info("This is an info message");
/// logger.warn("This is a warning");
///
/// logger.close()?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct Logger {
    min_level: RwLock<LogLevel>,
    lifecycle: RwLock<Lifecycle>,
    /// Serializes close() so every caller waits for the drain
    shutdown: Mutex<()>,
    dispatcher: Arc<Mutex<Dispatcher>>,
    path: PathBuf,
    queue_capacity: usize,
    metrics: Arc<LoggerMetrics>,
    diagnostics: SharedDiagnostics,
}

impl Logger {
    /// Open `path` with a threshold of `max_size_mb` megabytes
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened or the threshold is zero
    pub fn new(
        path: impl Into<PathBuf>,
        min_level: LogLevel,
        max_size_mb: u64,
        console: bool,
    ) -> Result<Self> {
        Self::from_config(LoggerConfig::new(path, min_level, max_size_mb, console))
    }

    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use rotating_logger::prelude::*;
    ///
    /// let logger = Logger::builder("logs/app.log")
    ///     .min_level(LogLevel::Debug)
    ///     .max_size_mb(10)
    ///     .console(true)
    ///     .build()?;
    /// # Ok::<(), LoggerError>(())
    /// ```
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(path)
    }

    /// Spawn the dispatcher thread
    ///
    /// # Errors
    ///
    /// `WorkerAlreadyStarted` on a second call, `LoggerStopped` after close,
    /// `IoOperation` if the thread cannot be spawned (the logger stays startable)
    pub fn start_worker(&self) -> Result<()> {
        self.start_with(|dispatcher, receiver| {
            thread::Builder::new()
                .name("log-dispatcher".to_string())
                .spawn(move || Dispatcher::run(dispatcher, receiver))
        })
    }

    fn start_with<F>(&self, spawn: F) -> Result<()>
    where
        F: FnOnce(Arc<Mutex<Dispatcher>>, Receiver<LogEntry>) -> io::Result<thread::JoinHandle<()>>,
    {
        let mut lifecycle = self.lifecycle.write();
        match std::mem::replace(&mut *lifecycle, Lifecycle::Closed) {
            Lifecycle::Created { sender, receiver } => {
                match spawn(Arc::clone(&self.dispatcher), receiver.clone()) {
                    Ok(worker) => {
                        *lifecycle = Lifecycle::Running { sender, worker };
                        Ok(())
                    }
                    Err(e) => {
                        // Still startable; close() has not run
                        *lifecycle = Lifecycle::Created { sender, receiver };
                        Err(LoggerError::io_operation(
                            "start dispatcher",
                            "Failed to spawn dispatcher thread",
                            e,
                        ))
                    }
                }
            }
            running @ Lifecycle::Running { .. } => {
                *lifecycle = running;
                Err(LoggerError::WorkerAlreadyStarted)
            }
            Lifecycle::Closed => Err(LoggerError::LoggerStopped),
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    /// Submit an entry, blocking while the queue is full
    ///
    /// Entries below the minimum level are dropped and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// `WorkerNotStarted` before `start_worker`, `LoggerStopped` after close,
    /// `ChannelSendError` if the worker is gone
    pub fn try_log(&self, level: LogLevel, message: impl AsRef<str>) -> Result<()> {
        if level < *self.min_level.read() {
            return Ok(());
        }

        // Held across the send so close() cannot drop the sender mid-flight
        let lifecycle = self.lifecycle.read();
        let sender = match &*lifecycle {
            Lifecycle::Running { sender, .. } => sender,
            Lifecycle::Created { .. } => return Err(LoggerError::WorkerNotStarted),
            Lifecycle::Closed => return Err(LoggerError::LoggerStopped),
        };

        let entry = LogEntry::new(level, message);
        match sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                self.metrics.record_block();
                sender
                    .send(entry)
                    .map_err(|_| LoggerError::ChannelSendError)?;
            }
            Err(TrySendError::Disconnected(_)) => return Err(LoggerError::ChannelSendError),
        }
        self.metrics.record_accepted();
        Ok(())
    }

    /// Like [`Logger::try_log`], reporting failures to the diagnostic sink
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        if let Err(e) = self.try_log(level, message) {
            self.diagnostics.report(&e);
        }
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    /// Rotate the log file now, regardless of the byte counter
    ///
    /// # Errors
    ///
    /// `LoggerStopped` after close, or an I/O error if the fresh file
    /// cannot be opened
    pub fn rotate(&self) -> Result<()> {
        // Held so close() cannot release the file while we reopen it
        let lifecycle = self.lifecycle.read();
        if let Lifecycle::Closed = *lifecycle {
            return Err(LoggerError::LoggerStopped);
        }
        self.dispatcher.lock().rotate()
    }

    /// Stop accepting entries, drain the queue and close the log file
    ///
    /// Blocks until the worker has written every queued entry, including
    /// when another thread is already closing. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// `WorkerPanicked` if the worker thread could not be joined cleanly
    pub fn close(&self) -> Result<()> {
        let _shutdown = self.shutdown.lock();
        let previous = std::mem::replace(&mut *self.lifecycle.write(), Lifecycle::Closed);

        let joined = match previous {
            Lifecycle::Running { sender, worker } => {
                // Dropping the last sender ends the worker loop once drained
                drop(sender);
                worker.join().map_err(LoggerError::from_panic)
            }
            Lifecycle::Created { .. } => Ok(()),
            Lifecycle::Closed => return Ok(()),
        };

        self.dispatcher.lock().close();
        joined
    }

    pub fn state(&self) -> LoggerState {
        self.lifecycle.read().state()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Bytes counted toward the threshold since the last rotation
    pub fn bytes_since_rotation(&self) -> u64 {
        self.dispatcher.lock().file().bytes_since_rotation()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rotating_logger::prelude::*;
    ///
    /// let logger = Logger::new("logs/app.log", LogLevel::Info, 1, false)?;
    /// let metrics = logger.metrics();
    /// println!("Written: {}", metrics.written_count());
    /// println!("Rotations: {}", metrics.rotation_count());
    /// # Ok::<(), LoggerError>(())
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            self.diagnostics.report(&e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use rotating_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder("logs/app.log")
///     .min_level(LogLevel::Info)
///     .max_bytes(64 * 1024)
///     .queue_capacity(500)
///     .timestamp_format(TimestampFormat::Iso8601)
///     .diagnostics(Arc::new(CollectingSink::new()))
///     .build()?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    max_bytes: Option<u64>,
    console_colors: bool,
    console_writer: Option<Box<dyn Write + Send>>,
    diagnostics: Option<SharedDiagnostics>,
}

impl LoggerBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(LoggerConfig::new(path, LogLevel::Info, 10, false))
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            max_bytes: None,
            console_colors: true,
            console_writer: None,
            diagnostics: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    /// Rotation threshold in megabytes
    #[must_use = "builder methods return a new value"]
    pub fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.config.max_size_mb = megabytes;
        self.max_bytes = None;
        self
    }

    /// Rotation threshold in bytes, overriding `max_size_mb`
    #[must_use = "builder methods return a new value"]
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    /// Echo entries to the console
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    /// Echo to `writer` instead of standard output; implies `console(true)`
    #[must_use = "builder methods return a new value"]
    pub fn console_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.config.console = true;
        self.console_writer = Some(Box::new(writer));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Where write and housekeeping failures are reported (stderr by default)
    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, sink: SharedDiagnostics) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Validate the configuration and open the log file
    ///
    /// # Errors
    ///
    /// Returns error on invalid configuration or if the file cannot be opened
    pub fn build(self) -> Result<Logger> {
        self.config.validate_destination()?;
        let max_bytes = match self.max_bytes {
            Some(0) => {
                return Err(LoggerError::config(
                    "LoggerBuilder",
                    "max_bytes must be positive",
                ))
            }
            Some(bytes) => bytes,
            None => {
                self.config.validate()?;
                self.config.max_bytes()
            }
        };

        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(StderrSink) as SharedDiagnostics);

        let file = RotatingFile::open(&self.config.path, max_bytes, Arc::clone(&diagnostics))?
            .with_timestamp_format(self.config.timestamp_format.clone());

        let console = if self.config.console {
            Some(match self.console_writer {
                Some(writer) => ConsoleAppender::with_writer(writer, self.console_colors),
                None => ConsoleAppender::with_colors(self.console_colors),
            })
        } else {
            None
        };

        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Dispatcher::new(
            file,
            console,
            Arc::clone(&metrics),
            Arc::clone(&diagnostics),
        );
        let (sender, receiver) = bounded(self.config.queue_capacity);

        Ok(Logger {
            min_level: RwLock::new(self.config.min_level),
            lifecycle: RwLock::new(Lifecycle::Created { sender, receiver }),
            shutdown: Mutex::new(()),
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            path: self.config.path,
            queue_capacity: self.config.queue_capacity,
            metrics,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::CollectingSink;
    use std::fs;
    use tempfile::tempdir;

    fn quiet_logger(path: &Path, sink: &Arc<CollectingSink>) -> Logger {
        Logger::builder(path)
            .min_level(LogLevel::Debug)
            .diagnostics(sink.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let dir = tempdir().unwrap();
        let logger = Logger::builder(dir.path().join("app.log")).build().unwrap();

        assert_eq!(logger.level(), LogLevel::Info);
        assert_eq!(logger.state(), LoggerState::Created);
        assert_eq!(logger.queue_capacity(), crate::core::config::DEFAULT_QUEUE_CAPACITY);
        assert_eq!(logger.bytes_since_rotation(), 0);
    }

    #[test]
    fn test_new_converts_megabytes() {
        let dir = tempdir().unwrap();
        let logger = Logger::new(dir.path().join("mb.log"), LogLevel::Warn, 2, false).unwrap();
        assert_eq!(logger.dispatcher.lock().file().max_bytes(), 2 * 1024 * 1024);
        assert_eq!(logger.level(), LogLevel::Warn);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let dir = tempdir().unwrap();
        let result = Logger::new(dir.path().join("zero.log"), LogLevel::Info, 0, false);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));

        let result = Logger::builder(dir.path().join("zero.log")).max_bytes(0).build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_emit_before_start_is_rejected() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&dir.path().join("early.log"), &sink);

        assert!(matches!(
            logger.try_log(LogLevel::Info, "too early"),
            Err(LoggerError::WorkerNotStarted)
        ));

        logger.info("also too early");
        assert!(sink.contains("not started"));
        assert_eq!(logger.metrics().accepted_count(), 0);
    }

    #[test]
    fn test_second_start_fails() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&dir.path().join("twice.log"), &sink);

        logger.start_worker().unwrap();
        assert!(matches!(
            logger.start_worker(),
            Err(LoggerError::WorkerAlreadyStarted)
        ));
        assert_eq!(logger.state(), LoggerState::Running);
        logger.close().unwrap();
    }

    #[test]
    fn test_failed_spawn_keeps_logger_startable() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("spawn.log");
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&log_path, &sink);

        let result = logger.start_with(|_, _| Err(io::Error::new(io::ErrorKind::Other, "no threads")));
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
        assert_eq!(logger.state(), LoggerState::Created);

        logger.start_worker().unwrap();
        logger.info("started on retry");
        logger.close().unwrap();
        assert!(fs::read_to_string(&log_path).unwrap().contains("[INFO] started on retry"));
    }

    #[test]
    fn test_emit_after_close_is_rejected() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&dir.path().join("late.log"), &sink);

        logger.start_worker().unwrap();
        logger.close().unwrap();

        assert_eq!(logger.state(), LoggerState::Closed);
        assert!(matches!(
            logger.try_log(LogLevel::Error, "too late"),
            Err(LoggerError::LoggerStopped)
        ));
        assert!(matches!(logger.start_worker(), Err(LoggerError::LoggerStopped)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&dir.path().join("idem.log"), &sink);

        logger.close().unwrap();
        logger.close().unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_filtered_entry_is_a_no_op() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&dir.path().join("filter.log"), &sink);
        logger.set_level(LogLevel::Error);

        // Filtering happens before the lifecycle check, so this is not an error
        assert!(logger.try_log(LogLevel::Warn, "ignored").is_ok());
        assert_eq!(logger.metrics().accepted_count(), 0);
    }

    #[test]
    fn test_manual_rotate() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("manual.log");
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&log_path, &sink);

        logger.start_worker().unwrap();
        logger.info("before");
        logger.rotate().unwrap();
        assert_eq!(logger.metrics().rotation_count(), 1);
        logger.info("after");
        logger.close().unwrap();

        let archives = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("manual.log."))
            .count();
        assert_eq!(archives, 1);
        assert!(fs::read_to_string(&log_path).unwrap().contains("[INFO] after"));
    }

    #[test]
    fn test_rotate_after_close_is_rejected() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("closed_rotate.log");
        let sink = CollectingSink::shared();
        let logger = quiet_logger(&log_path, &sink);

        logger.start_worker().unwrap();
        logger.info("final entry");
        logger.close().unwrap();

        assert!(matches!(logger.rotate(), Err(LoggerError::LoggerStopped)));
        assert_eq!(logger.metrics().rotation_count(), 0);
        assert!(!logger.dispatcher.lock().file().is_open());

        // The last session's log stays in place, no archive is produced
        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.ends_with("[INFO] final entry\n"));
        let archives = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("closed_rotate.log."))
            .count();
        assert_eq!(archives, 0);
    }

    #[test]
    fn test_concurrent_close_waits_for_drain() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("double_close.log");
        let sink = CollectingSink::shared();
        let logger = Arc::new(quiet_logger(&log_path, &sink));

        logger.start_worker().unwrap();
        for i in 0..2000 {
            logger.debug(format!("queued {}", i));
        }

        let closers: Vec<_> = (0..4)
            .map(|_| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    logger.close().unwrap();
                    // Every caller returns only after the drain
                    logger.metrics().written_count()
                })
            })
            .collect();

        for closer in closers {
            assert_eq!(closer.join().unwrap(), 2000);
        }
        assert_eq!(fs::read_to_string(&log_path).unwrap().lines().count(), 2000);
    }

    #[test]
    fn test_drop_drains_queue() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("drop.log");
        let sink = CollectingSink::shared();
        {
            let logger = quiet_logger(&log_path, &sink);
            logger.start_worker().unwrap();
            for i in 0..10 {
                logger.debug(format!("queued {}", i));
            }
        }

        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 10);
    }
}
