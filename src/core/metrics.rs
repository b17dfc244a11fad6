//! Logger metrics for observability
//!
//! Counters for monitoring pipeline health: emissions, level suppression,
//! transport failures and timeouts, escalations, and redaction faults.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_redacting_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_emitted();
/// metrics.record_transport_failure();
///
/// assert_eq!(metrics.emitted(), 1);
/// assert_eq!(metrics.transport_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries assembled and dispatched
    emitted: AtomicU64,

    /// Calls rejected by the level threshold
    suppressed: AtomicU64,

    /// Transport errors, panics and timeouts
    transport_failures: AtomicU64,

    /// Subset of failures that were timeouts
    transport_timeouts: AtomicU64,

    /// Escalation events published
    escalations: AtomicU64,

    /// Warnings printed for duplicate transport registration
    duplicate_warnings: AtomicU64,

    /// Entries written by the console fallback
    fallback_writes: AtomicU64,

    /// Redaction rules that failed to evaluate
    redaction_errors: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            transport_timeouts: AtomicU64::new(0),
            escalations: AtomicU64::new(0),
            duplicate_warnings: AtomicU64::new(0),
            fallback_writes: AtomicU64::new(0),
            redaction_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_failures(&self) -> u64 {
        self.transport_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_timeouts(&self) -> u64 {
        self.transport_timeouts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn escalations(&self) -> u64 {
        self.escalations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn duplicate_warnings(&self) -> u64 {
        self.duplicate_warnings.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_writes(&self) -> u64 {
        self.fallback_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn redaction_errors(&self) -> u64 {
        self.redaction_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transport_failure(&self) -> u64 {
        self.transport_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a timeout; also counts as a transport failure
    #[inline]
    pub fn record_transport_timeout(&self) -> u64 {
        self.record_transport_failure();
        self.transport_timeouts.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_escalation(&self) -> u64 {
        self.escalations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_duplicate_warning(&self) -> u64 {
        self.duplicate_warnings.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback_write(&self) -> u64 {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_redaction_error(&self) -> u64 {
        self.redaction_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
        self.transport_failures.store(0, Ordering::Relaxed);
        self.transport_timeouts.store(0, Ordering::Relaxed);
        self.escalations.store(0, Ordering::Relaxed);
        self.duplicate_warnings.store(0, Ordering::Relaxed);
        self.fallback_writes.store(0, Ordering::Relaxed);
        self.redaction_errors.store(0, Ordering::Relaxed);
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
            emitted: AtomicU64::new(self.emitted()),
            suppressed: AtomicU64::new(self.suppressed()),
            transport_failures: AtomicU64::new(self.transport_failures()),
            transport_timeouts: AtomicU64::new(self.transport_timeouts()),
            escalations: AtomicU64::new(self.escalations()),
            duplicate_warnings: AtomicU64::new(self.duplicate_warnings()),
            fallback_writes: AtomicU64::new(self.fallback_writes()),
            redaction_errors: AtomicU64::new(self.redaction_errors()),
        }
    }
}
