//! Transport traits for log output destinations

use super::{async_transport::AsyncTransport, error::Result, log_entry::ProcessedLogEntry};
use std::fmt;
use std::sync::Arc;

/// A synchronous sink, run inline before `emit` returns
pub trait Transport: Send + Sync {
    fn send(&self, entry: &ProcessedLogEntry) -> Result<()>;
    fn name(&self) -> &str;
}

/// A registered transport of either kind
///
/// Identity is the `Arc` allocation: registering a clone of an already
/// registered handle is a duplicate.
#[derive(Clone)]
pub enum TransportHandle {
    Sync(Arc<dyn Transport>),
    Async(Arc<dyn AsyncTransport>),
}

impl TransportHandle {
    pub fn sync<T: Transport + 'static>(transport: T) -> Self {
        TransportHandle::Sync(Arc::new(transport))
    }

    pub fn asynchronous<T: AsyncTransport + 'static>(transport: T) -> Self {
        TransportHandle::Async(Arc::new(transport))
    }

    pub fn name(&self) -> &str {
        match self {
            TransportHandle::Sync(t) => t.name(),
            TransportHandle::Async(t) => t.name(),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, TransportHandle::Async(_))
    }

    /// Whether both handles point at the same transport instance
    pub fn same_as(&self, other: &TransportHandle) -> bool {
        self.addr() == other.addr()
    }

    fn addr(&self) -> *const () {
        match self {
            TransportHandle::Sync(t) => Arc::as_ptr(t) as *const (),
            TransportHandle::Async(t) => Arc::as_ptr(t) as *const (),
        }
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_async() { "async" } else { "sync" };
        write!(f, "TransportHandle({} {})", kind, self.name())
    }
}

impl From<Arc<dyn Transport>> for TransportHandle {
    fn from(t: Arc<dyn Transport>) -> Self {
        TransportHandle::Sync(t)
    }
}

impl From<Arc<dyn AsyncTransport>> for TransportHandle {
    fn from(t: Arc<dyn AsyncTransport>) -> Self {
        TransportHandle::Async(t)
    }
}

/// Closure-backed synchronous transport
pub struct FnTransport<F> {
    name: String,
    f: F,
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(&ProcessedLogEntry) -> Result<()> + Send + Sync,
{
    fn send(&self, entry: &ProcessedLogEntry) -> Result<()> {
        (self.f)(entry)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a closure as a registrable synchronous transport
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{sync_transport, LoggerState};
///
/// let state = LoggerState::new();
/// let printer = sync_transport("printer", |entry| {
///     println!("{} {}", entry.level, entry.message);
///     Ok(())
/// });
///
/// assert!(state.add_transport(printer.clone()));
/// assert!(!state.add_transport(printer));
/// ```
pub fn sync_transport<F>(name: impl Into<String>, f: F) -> TransportHandle
where
    F: Fn(&ProcessedLogEntry) -> Result<()> + Send + Sync + 'static,
{
    TransportHandle::sync(FnTransport {
        name: name.into(),
        f,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = sync_transport("a", |_| Ok(()));
        let b = sync_transport("a", |_| Ok(()));

        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_name_and_kind() {
        let t = sync_transport("stdout", |_| Ok(()));
        assert_eq!(t.name(), "stdout");
        assert!(!t.is_async());
        assert_eq!(format!("{:?}", t), "TransportHandle(sync stdout)");
    }
}
