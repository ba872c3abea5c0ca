//! Single background consumer for the entry queue
//!
//! The dispatcher is the only place that touches the log file after
//! construction. Each entry is written, counted and (if the threshold was
//! reached) followed by a rotation while the dispatcher mutex is held, so
//! writes, the byte counter and rotation never interleave.

use super::{
    diagnostics::SharedDiagnostics, error::LoggerError, log_entry::LogEntry,
    metrics::LoggerMetrics,
};
use crate::appenders::{ConsoleAppender, RotatingFile};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct Dispatcher {
    file: RotatingFile,
    console: Option<ConsoleAppender>,
    metrics: Arc<LoggerMetrics>,
    diagnostics: SharedDiagnostics,
}

impl Dispatcher {
    pub fn new(
        file: RotatingFile,
        console: Option<ConsoleAppender>,
        metrics: Arc<LoggerMetrics>,
        diagnostics: SharedDiagnostics,
    ) -> Self {
        Self {
            file,
            console,
            metrics,
            diagnostics,
        }
    }

    /// Drain `receiver` in arrival order until every sender is gone
    ///
    /// A panic while handling one entry is reported and the loop moves on.
    pub fn run(dispatcher: Arc<Mutex<Dispatcher>>, receiver: Receiver<LogEntry>) {
        for entry in receiver.iter() {
            let mut guard = dispatcher.lock();
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                guard.dispatch(&entry)
            }));
            if let Err(panic_info) = outcome {
                guard.metrics.record_write_failure();
                guard.diagnostics.report(&LoggerError::from_panic(panic_info));
            }
        }
    }

    /// Render, echo and persist one entry
    pub fn dispatch(&mut self, entry: &LogEntry) {
        let rendered = entry.render();

        if let Some(console) = self.console.as_mut() {
            if let Err(e) = console.write_line(entry.level(), &rendered) {
                self.diagnostics.report(&e);
            }
        }

        // A failed rotation leaves no active file; try to get one back first
        if !self.file.is_open() {
            self.rotate_reporting();
        }

        match self.file.write_line(entry.timestamp(), &rendered) {
            Ok(()) => {
                self.metrics.record_written();
                if self.file.needs_rotation() {
                    self.rotate_reporting();
                }
            }
            Err(e) => {
                self.metrics.record_write_failure();
                self.diagnostics.report(&e);
            }
        }
    }

    /// Rotate now, returning the failure to the caller
    pub fn rotate(&mut self) -> super::error::Result<()> {
        self.file.rotate()?;
        self.metrics.record_rotation();
        Ok(())
    }

    fn rotate_reporting(&mut self) {
        if let Err(e) = self.rotate() {
            self.diagnostics.report(&e);
        }
    }

    /// Flush the console and release the log file
    pub fn close(&mut self) {
        if let Some(console) = self.console.as_mut() {
            if let Err(e) = console.flush() {
                self.diagnostics.report(&e);
            }
        }
        if let Err(e) = self.file.close() {
            self.diagnostics.report(&e);
        }
    }

    pub fn file(&self) -> &RotatingFile {
        &self.file
    }
}
