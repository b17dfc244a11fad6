//! In-memory transport for tests and diagnostics

use crate::core::{LogLevel, ProcessedLogEntry, Result, Transport, TransportHandle};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every entry it receives
///
/// Clones share storage. Each call to [`handle`](Self::handle) wraps a fresh
/// clone, so registering two handles from the same capture counts as two
/// transports.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{transports::CaptureTransport, LoggerState};
///
/// let state = LoggerState::new();
/// let capture = CaptureTransport::new();
/// state.add_transport(capture.handle());
///
/// state.create_logger("app").info("hello");
/// assert_eq!(capture.messages(), vec!["hello".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct CaptureTransport {
    entries: Arc<Mutex<Vec<ProcessedLogEntry>>>,
}

impl CaptureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> TransportHandle {
        TransportHandle::sync(self.clone())
    }

    pub fn entries(&self) -> Vec<ProcessedLogEntry> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.entries.lock().iter().filter(|e| e.level == level).count()
    }

    pub fn last(&self) -> Option<ProcessedLogEntry> {
        self.entries.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Transport for CaptureTransport {
    fn send(&self, entry: &ProcessedLogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "capture"
    }
}
