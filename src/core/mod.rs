//! Core logger types

pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod timestamp;

pub use config::{LoggerConfig, DEFAULT_QUEUE_CAPACITY};
pub use diagnostics::{CollectingSink, DiagnosticSink, SharedDiagnostics, StderrSink};
pub use dispatcher::Dispatcher;
pub use error::{LoggerError, Result};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerState};
pub use metrics::LoggerMetrics;
pub use timestamp::TimestampFormat;
