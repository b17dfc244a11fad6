//! Async transport trait for non-blocking log output

use super::{error::Result, log_entry::ProcessedLogEntry, transport::TransportHandle};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Trait for asynchronous log transports
///
/// Each invocation is spawned on the ambient tokio runtime and tracked in
/// the pending set until it settles.
///
/// # Example
///
/// ```no_run
/// use rust_redacting_logger::core::{AsyncTransport, ProcessedLogEntry, Result};
/// use async_trait::async_trait;
///
/// struct Shipper;
///
/// #[async_trait]
/// impl AsyncTransport for Shipper {
///     async fn send(&self, entry: &ProcessedLogEntry) -> Result<()> {
///         // forward the entry somewhere
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "shipper"
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Deliver a log entry asynchronously
    async fn send(&self, entry: &ProcessedLogEntry) -> Result<()>;

    /// Get the transport name
    fn name(&self) -> &str;
}

/// Closure-backed asynchronous transport
pub struct AsyncFnTransport<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> AsyncTransport for AsyncFnTransport<F>
where
    F: Fn(Arc<ProcessedLogEntry>) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn send(&self, entry: &ProcessedLogEntry) -> Result<()> {
        (self.f)(Arc::new(entry.clone())).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a future-returning closure as a registrable async transport
///
/// # Example
///
/// ```
/// use futures::FutureExt;
/// use rust_redacting_logger::async_transport;
///
/// let transport = async_transport("noop", |_entry| async { Ok(()) }.boxed());
/// assert!(transport.is_async());
/// ```
pub fn async_transport<F>(name: impl Into<String>, f: F) -> TransportHandle
where
    F: Fn(Arc<ProcessedLogEntry>) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
{
    TransportHandle::asynchronous(AsyncFnTransport {
        name: name.into(),
        f,
    })
}
