//! Transport registry and fan-out of processed entries
//!
//! Synchronous transports run inline, in registration order, with each one
//! isolated from the others' errors and panics. Async transports of one
//! emission start in registration order from a single task on the ambient
//! tokio runtime and are tracked in the [`PendingSet`] until they settle.
//! With no transports registered, entries go to the console fallback.

use super::async_transport::AsyncTransport;
use super::config::TransportErrorCallback;
use super::error::{call_guarded, panic_message, LoggerError};
use super::escalation::EscalationBridge;
use super::log_entry::ProcessedLogEntry;
use super::metrics::LoggerMetrics;
use super::output_format::OutputFormat;
use super::pending::{PendingGuard, PendingSet};
use super::transport::{Transport, TransportHandle};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Routes transport failures to the error hook, the bus and the metrics
#[derive(Clone)]
pub(crate) struct FailureReporter {
    on_error: Option<TransportErrorCallback>,
    bridge: EscalationBridge,
    metrics: Arc<LoggerMetrics>,
}

impl FailureReporter {
    pub(crate) fn new(
        on_error: Option<TransportErrorCallback>,
        bridge: EscalationBridge,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            on_error,
            bridge,
            metrics,
        }
    }

    pub(crate) fn report(&self, transport: &str, err: LoggerError) {
        if matches!(err, LoggerError::TransportTimeout { .. }) {
            self.metrics.record_transport_timeout();
        } else {
            self.metrics.record_transport_failure();
        }

        if let Some(hook) = &self.on_error {
            call_guarded("on_transport_error", || hook(&err));
        }
        self.bridge.transport_failure(transport, &err);
    }
}

/// Per-emission settings read from the live config
pub(crate) struct DispatchContext {
    pub(crate) timeout: Option<Duration>,
    pub(crate) fallback_format: OutputFormat,
    pub(crate) reporter: FailureReporter,
}

#[derive(Default)]
struct Registry {
    transports: Vec<TransportHandle>,
    duplicate_warned: bool,
}

/// Ordered transport list plus in-flight tracking
pub struct TransportDispatcher {
    registry: RwLock<Registry>,
    pending: Arc<PendingSet>,
}

impl TransportDispatcher {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            pending: Arc::new(PendingSet::new()),
        }
    }

    /// Append a transport unless the same instance is already registered
    ///
    /// The first duplicate ever seen prints one warning; later ones are
    /// ignored silently.
    pub fn add(&self, handle: TransportHandle, metrics: &LoggerMetrics) -> bool {
        let mut registry = self.registry.write();

        if registry.transports.iter().any(|t| t.same_as(&handle)) {
            if !registry.duplicate_warned {
                registry.duplicate_warned = true;
                metrics.record_duplicate_warning();
                eprintln!(
                    "[LOGGER WARNING] Transport '{}' is already registered; ignoring duplicate",
                    handle.name()
                );
            }
            return false;
        }

        registry.transports.push(handle);
        true
    }

    pub fn clear(&self) {
        self.registry.write().transports.clear();
    }

    /// Snapshot of the registered transports, in order
    pub fn list(&self) -> Vec<TransportHandle> {
        self.registry.read().transports.clone()
    }

    pub fn len(&self) -> usize {
        self.registry.read().transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().transports.is_empty()
    }

    pub fn pending(&self) -> &Arc<PendingSet> {
        &self.pending
    }

    /// Drop all transports, pending entries and the duplicate-warning latch
    pub fn reset(&self) {
        *self.registry.write() = Registry::default();
        self.pending.clear();
    }

    /// Deliver an entry to every registered transport
    ///
    /// Works on a snapshot, so transports may log or register transports
    /// re-entrantly.
    pub(crate) fn dispatch(&self, entry: &Arc<ProcessedLogEntry>, ctx: &DispatchContext) {
        let transports = self.list();

        if transports.is_empty() {
            write_fallback(entry, ctx.fallback_format);
            ctx.reporter.metrics.record_fallback_write();
            return;
        }

        let mut deferred = Vec::new();
        for transport in &transports {
            match transport {
                TransportHandle::Sync(t) => run_sync(t.as_ref(), entry, &ctx.reporter),
                TransportHandle::Async(t) => deferred.push(Arc::clone(t)),
            }
        }

        if !deferred.is_empty() {
            self.spawn_async(deferred, entry, ctx);
        }
    }

    /// Start every async invocation of one emission from a single task
    ///
    /// The invocations are first polled in registration order, so
    /// transport N always begins before transport N+1.
    fn spawn_async(
        &self,
        transports: Vec<Arc<dyn AsyncTransport>>,
        entry: &Arc<ProcessedLogEntry>,
        ctx: &DispatchContext,
    ) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                for transport in &transports {
                    ctx.reporter
                        .report(transport.name(), LoggerError::no_runtime(transport.name()));
                }
                return;
            }
        };

        let invocations: FuturesUnordered<_> = transports
            .into_iter()
            .map(|transport| {
                invoke(
                    transport,
                    self.pending.register(),
                    Arc::clone(entry),
                    ctx.reporter.clone(),
                    ctx.timeout,
                )
            })
            .collect();

        runtime.spawn(async move {
            invocations.for_each(|()| async {}).await;
        });
    }
}

/// Run one async invocation; the guard keeps it pending until it settles
async fn invoke(
    transport: Arc<dyn AsyncTransport>,
    guard: PendingGuard,
    entry: Arc<ProcessedLogEntry>,
    reporter: FailureReporter,
    timeout: Option<Duration>,
) {
    let _guard = guard;
    let name = transport.name().to_string();
    let mut call = Box::pin(AssertUnwindSafe(transport.send(&entry)).catch_unwind());

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                reporter.report(&name, LoggerError::transport_timeout(&name, limit));
                // stay pending until the work settles; its outcome is not reported
                let _ = call.await;
                return;
            }
        },
        None => call.await,
    };

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => reporter.report(&name, err),
        Err(panic_info) => reporter.report(
            &name,
            LoggerError::transport_panic(&name, panic_message(panic_info.as_ref())),
        ),
    }
}

impl Default for TransportDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn run_sync(transport: &dyn Transport, entry: &ProcessedLogEntry, reporter: &FailureReporter) {
    match catch_unwind(AssertUnwindSafe(|| transport.send(entry))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => reporter.report(transport.name(), err),
        Err(panic_info) => {
            let name = transport.name();
            reporter.report(
                name,
                LoggerError::transport_panic(name, panic_message(panic_info.as_ref())),
            );
        }
    }
}

/// Console output used when no transport is registered
fn write_fallback(entry: &ProcessedLogEntry, format: OutputFormat) {
    println!("{}", format.format(entry));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{async_transport, sync_transport, LogLevel};
    use parking_lot::Mutex;
    use serde_json::Map;

    fn ctx(metrics: &Arc<LoggerMetrics>, timeout: Option<Duration>) -> DispatchContext {
        DispatchContext {
            timeout,
            fallback_format: OutputFormat::Text,
            reporter: FailureReporter::new(None, EscalationBridge::default(), Arc::clone(metrics)),
        }
    }

    fn entry() -> Arc<ProcessedLogEntry> {
        Arc::new(ProcessedLogEntry::new("test", LogLevel::Info, "hello", Map::new()))
    }

    #[test]
    fn test_duplicate_registration() {
        let metrics = LoggerMetrics::new();
        let dispatcher = TransportDispatcher::new();
        let t = sync_transport("t", |_| Ok(()));

        assert!(dispatcher.add(t.clone(), &metrics));
        assert!(!dispatcher.add(t.clone(), &metrics));
        assert!(!dispatcher.add(t, &metrics));

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(metrics.duplicate_warnings(), 1);
    }

    #[test]
    fn test_sync_order_and_isolation() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        dispatcher.add(
            sync_transport("first", move |_| {
                first.lock().push("first");
                Err(LoggerError::other("nope"))
            }),
            &metrics,
        );
        dispatcher.add(sync_transport("boom", |_| panic!("kaboom")), &metrics);
        let last = Arc::clone(&seen);
        dispatcher.add(
            sync_transport("last", move |_| {
                last.lock().push("last");
                Ok(())
            }),
            &metrics,
        );

        dispatcher.dispatch(&entry(), &ctx(&metrics, None));

        assert_eq!(*seen.lock(), vec!["first", "last"]);
        assert_eq!(metrics.transport_failures(), 2);
    }

    #[test]
    fn test_async_without_runtime_is_reported() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();
        dispatcher.add(
            async_transport("remote", |_| async { Ok(()) }.boxed()),
            &metrics,
        );

        dispatcher.dispatch(&entry(), &ctx(&metrics, None));

        assert_eq!(metrics.transport_failures(), 1);
        assert!(dispatcher.pending().is_empty());
    }

    #[test]
    fn test_fallback_when_empty() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();

        dispatcher.dispatch(&entry(), &ctx(&metrics, None));

        assert_eq!(metrics.fallback_writes(), 1);
    }

    #[tokio::test]
    async fn test_async_tracked_until_settled() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();
        dispatcher.add(
            async_transport("slow", |_| {
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(())
                }
                .boxed()
            }),
            &metrics,
        );

        dispatcher.dispatch(&entry(), &ctx(&metrics, None));
        assert_eq!(dispatcher.pending().len(), 1);

        assert!(dispatcher.pending().wait_until_empty(Duration::from_millis(500)).await);
        assert_eq!(metrics.transport_failures(), 0);
    }

    #[tokio::test]
    async fn test_async_timeout_reported_once() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();
        dispatcher.add(
            async_transport("slow", |_| {
                async {
                    tokio::time::sleep(Duration::from_millis(40)).await;
                    Err(LoggerError::other("late failure"))
                }
                .boxed()
            }),
            &metrics,
        );

        dispatcher.dispatch(&entry(), &ctx(&metrics, Some(Duration::from_millis(10))));

        assert!(dispatcher.pending().wait_until_empty(Duration::from_millis(500)).await);
        assert_eq!(metrics.transport_timeouts(), 1);
        assert_eq!(metrics.transport_failures(), 1);
    }

    #[tokio::test]
    async fn test_async_panic_is_contained() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = TransportDispatcher::new();
        dispatcher.add(
            async_transport("explode", |_| {
                async {
                    let explode = true;
                    if explode {
                        panic!("async boom");
                    }
                    Ok(())
                }
                .boxed()
            }),
            &metrics,
        );

        dispatcher.dispatch(&entry(), &ctx(&metrics, None));

        assert!(dispatcher.pending().wait_until_empty(Duration::from_millis(500)).await);
        assert_eq!(metrics.transport_failures(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_async_start_follows_registration_order() {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Arc::new(TransportDispatcher::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            dispatcher.add(
                async_transport(name, move |_| {
                    seen.lock().push(name);
                    async { Ok(()) }.boxed()
                }),
                &metrics,
            );
        }

        let emitter = {
            let dispatcher = Arc::clone(&dispatcher);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                dispatcher.dispatch(&entry(), &ctx(&metrics, None));
            })
        };
        emitter.await.unwrap();

        assert!(dispatcher.pending().wait_until_empty(Duration::from_millis(500)).await);
        assert_eq!(*seen.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_reset_clears_latch() {
        let metrics = LoggerMetrics::new();
        let dispatcher = TransportDispatcher::new();
        let t = sync_transport("t", |_| Ok(()));
        dispatcher.add(t.clone(), &metrics);
        dispatcher.add(t.clone(), &metrics);

        dispatcher.reset();
        assert!(dispatcher.is_empty());

        dispatcher.add(t.clone(), &metrics);
        dispatcher.add(t, &metrics);
        assert_eq!(metrics.duplicate_warnings(), 2);
    }
}
