//! # Rotating Logger
//!
//! An asynchronous logger that writes to a size-rotating file.
//!
//! ## Features
//!
//! - **Non-blocking emits**: entries go through a bounded queue to a single
//!   background dispatcher; a full queue slows callers down instead of
//!   dropping entries
//! - **Size-based rotation**: the active file is retired as
//!   `<path>.<YYYYMMDD_HHMMSS>.log` once the byte threshold is reached
//! - **Drain on close**: `close()` returns only after every accepted entry
//!   has been written
//! - **Console echo**: optional, colored by level

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, RotatingFile};
    pub use crate::core::{
        CollectingSink, DiagnosticSink, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, LoggerState, Result, SharedDiagnostics, StderrSink,
        TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, RotatingFile};
pub use core::{
    CollectingSink, DiagnosticSink, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerMetrics, LoggerState, Result, SharedDiagnostics, StderrSink,
    TimestampFormat,
};
