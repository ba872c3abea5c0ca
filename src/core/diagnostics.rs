//! Diagnostic sinks for failures the logger cannot log through itself
//!
//! Write errors, rotation housekeeping failures and rejected emits never
//! reach the caller as a panic. They are reported to a [`DiagnosticSink`]
//! instead, which defaults to standard error.

use super::error::LoggerError;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &LoggerError);
}

/// Shared handle to a diagnostic sink
pub type SharedDiagnostics = Arc<dyn DiagnosticSink>;

impl<F> DiagnosticSink for F
where
    F: Fn(&LoggerError) + Send + Sync,
{
    fn report(&self, error: &LoggerError) {
        self(error)
    }
}

/// Prints every report to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, error: &LoggerError) {
        eprintln!("[LOGGER ERROR] {}", error);
    }
}

/// Keeps rendered reports in memory
///
/// # Example
///
/// ```
/// use rotating_logger::core::{CollectingSink, DiagnosticSink, LoggerError};
///
/// let sink = CollectingSink::new();
/// sink.report(&LoggerError::LoggerStopped);
/// assert!(sink.contains("stopped"));
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<String>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// Whether any report contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.reports.lock().iter().any(|r| r.contains(needle))
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, error: &LoggerError) {
        self.reports.lock().push(error.to_string());
    }
}
