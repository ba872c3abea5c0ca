//! Logger metrics for observability
//!
//! Counters for accepted entries, completed and failed writes, rotations
//! and backpressure waits.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rotating_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_written();
///
/// assert_eq!(metrics.accepted_count(), 1);
/// assert_eq!(metrics.written_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries that passed the level filter and were queued
    accepted_count: AtomicU64,

    /// Entries written to the active file
    written_count: AtomicU64,

    /// Entries lost to a failed file write
    write_failures: AtomicU64,

    /// Rotations performed after construction
    rotation_count: AtomicU64,

    /// Emits that found the queue full and had to wait
    block_events: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            accepted_count: AtomicU64::new(0),
            written_count: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            rotation_count: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_count(&self) -> u64 {
        self.rotation_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotation_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Entries accepted but not yet written or failed
    pub fn pending(&self) -> u64 {
        self.accepted_count()
            .saturating_sub(self.written_count() + self.write_failures())
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted_count.store(0, Ordering::Relaxed);
        self.written_count.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.rotation_count.store(0, Ordering::Relaxed);
        self.block_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            accepted_count: AtomicU64::new(self.accepted_count()),
            written_count: AtomicU64::new(self.written_count()),
            write_failures: AtomicU64::new(self.write_failures()),
            rotation_count: AtomicU64::new(self.rotation_count()),
            block_events: AtomicU64::new(self.block_events()),
        }
    }
}
