//! Process-wide logging state: live config, transports, pending set and bus

use super::config::{ConfigPatch, LoggerConfig};
use super::dispatcher::{DispatchContext, FailureReporter, TransportDispatcher};
use super::error::{call_guarded, RedactionError};
use super::escalation::{EscalationBridge, EventBus};
use super::log_context::{FieldValue, LogContext};
use super::log_entry::{ProcessedLogEntry, RESERVED_KEYS};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::metrics::LoggerMetrics;
use super::output_format::OutputFormat;
use super::pending::DEFAULT_DRAIN_TIMEOUT;
use super::sampling::{LogSampler, SamplerMetrics};
use super::transport::TransportHandle;
use crate::redaction::Redactor;
use crate::transports::ConsoleTransport;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable that pre-registers a JSON stdout transport
pub const STDOUT_JSON_ENV: &str = "LOG_STDOUT_JSON";

/// Config snapshot with its compiled redactor
#[derive(Clone)]
struct Live {
    config: Arc<LoggerConfig>,
    redactor: Arc<Redactor>,
}

impl Live {
    fn compile(config: LoggerConfig, metrics: &Arc<LoggerMetrics>) -> Self {
        let mut options = config.redaction_options();
        let user_hook = options.on_error.take();
        let metrics = Arc::clone(metrics);
        options.on_error = Some(Arc::new(move |err: &RedactionError| {
            metrics.record_redaction_error();
            if let Some(hook) = &user_hook {
                hook(err);
            }
        }));

        Self {
            config: Arc::new(config),
            redactor: Arc::new(Redactor::new(options)),
        }
    }
}

/// Shared state behind every [`Logger`]
///
/// One instance normally lives for the whole process (see
/// [`global`](crate::global::global)), but independent instances can be
/// created for tests or embedding.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{ConfigPatch, LogLevel, LoggerState};
///
/// let state = LoggerState::new();
/// state.configure(ConfigPatch::new().level(LogLevel::Warn));
///
/// let log = state.create_logger("app");
/// assert!(log.info("dropped").is_none());
/// assert!(log.warn("kept").is_some());
/// ```
pub struct LoggerState {
    live: RwLock<Live>,
    dispatcher: TransportDispatcher,
    bridge: RwLock<EscalationBridge>,
    sampler: LogSampler,
    metrics: Arc<LoggerMetrics>,
}

impl LoggerState {
    /// Fresh state with factory defaults and no transports
    pub fn new() -> Arc<Self> {
        let metrics = Arc::new(LoggerMetrics::new());
        Arc::new(Self {
            live: RwLock::new(Live::compile(LoggerConfig::default(), &metrics)),
            dispatcher: TransportDispatcher::new(),
            bridge: RwLock::new(EscalationBridge::default()),
            sampler: LogSampler::new(),
            metrics,
        })
    }

    /// Fresh state honoring [`STDOUT_JSON_ENV`]
    pub fn from_env() -> Arc<Self> {
        let state = Self::new();
        if env_flag(STDOUT_JSON_ENV) {
            state.add_transport(TransportHandle::sync(ConsoleTransport::json()));
        }
        state
    }

    /// Create a logger rooted at `root`
    pub fn create_logger(self: &Arc<Self>, root: impl Into<String>) -> Logger {
        Logger::new(Arc::clone(self), root)
    }

    /// Merge a partial update into the live config
    ///
    /// The new config applies to every logger from the next emission on.
    pub fn configure(&self, patch: ConfigPatch) {
        let mut live = self.live.write();
        let mut config = LoggerConfig::clone(&live.config);
        patch.apply_to(&mut config);
        *live = Live::compile(config, &self.metrics);
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.configure(ConfigPatch::new().level(level));
    }

    /// Current config snapshot
    pub fn config(&self) -> Arc<LoggerConfig> {
        Arc::clone(&self.live.read().config)
    }

    /// Register a transport; returns `false` for a duplicate
    pub fn add_transport(&self, transport: impl Into<TransportHandle>) -> bool {
        self.dispatcher.add(transport.into(), &self.metrics)
    }

    pub fn clear_transports(&self) {
        self.dispatcher.clear();
    }

    pub fn list_transports(&self) -> Vec<TransportHandle> {
        self.dispatcher.list()
    }

    /// Number of async transport invocations still in flight
    pub fn pending_transports_count(&self) -> usize {
        self.dispatcher.pending().len()
    }

    /// Wait for in-flight async transports, bounded by `timeout`
    ///
    /// Defaults to 500ms. Returns `true` if everything settled in time.
    pub async fn drain(&self, timeout: Option<Duration>) -> bool {
        let pending = Arc::clone(self.dispatcher.pending());
        pending
            .wait_until_empty(timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT))
            .await
    }

    pub fn set_event_bus(&self, bus: Arc<dyn EventBus>) {
        *self.bridge.write() = EscalationBridge::new(Some(bus));
    }

    pub fn clear_event_bus(&self) {
        *self.bridge.write() = EscalationBridge::default();
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn sampler_metrics(&self) -> &SamplerMetrics {
        self.sampler.metrics()
    }

    /// Restore factory config and drop all transports and pending entries
    ///
    /// The event bus stays attached.
    pub fn reset_for_tests(&self) {
        *self.live.write() = Live::compile(LoggerConfig::default(), &self.metrics);
        self.dispatcher.reset();
        self.metrics.reset();
        self.sampler.metrics().reset();
    }

    /// Run one emission through level, sampling, redaction, dispatch and
    /// escalation
    pub(crate) fn emit(
        &self,
        namespace: &str,
        bound: &LogContext,
        level: LogLevel,
        message: String,
        context: Option<LogContext>,
    ) -> Option<Arc<ProcessedLogEntry>> {
        let live = self.live.read().clone();
        let config = &live.config;

        if level < config.level {
            self.metrics.record_suppressed();
            return None;
        }
        if !self.sampler.should_sample(level, config.sample_rate(level)) {
            return None;
        }

        let mut merged = bound.clone();
        if let Some(context) = context {
            merged.merge(&context);
        }

        let correlation_id = take_string(&mut merged, "correlationId").or_else(|| {
            config
                .correlation_provider
                .as_ref()
                .and_then(|provider| call_guarded("correlation_provider", || provider()).flatten())
        });
        let error_code = take_string(&mut merged, "errorCode");
        for key in RESERVED_KEYS {
            merged.remove(key);
        }

        let fields = live.redactor.redact_context(&merged);
        let entry = Arc::new(
            ProcessedLogEntry::new(namespace, level, message, fields)
                .with_correlation_id(correlation_id)
                .with_error_code(error_code),
        );
        self.metrics.record_emitted();

        let bridge = self.bridge.read().clone();
        let ctx = DispatchContext {
            timeout: config.transport_timeout,
            fallback_format: OutputFormat::from_json_flag(config.json),
            reporter: FailureReporter::new(
                config.on_transport_error.clone(),
                bridge.clone(),
                Arc::clone(&self.metrics),
            ),
        };
        self.dispatcher.dispatch(&entry, &ctx);

        if level.escalates() && config.escalate && bridge.escalate(&entry) {
            self.metrics.record_escalation();
        }

        Some(entry)
    }
}

impl std::fmt::Debug for LoggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerState")
            .field("config", &self.config())
            .field("transports", &self.dispatcher.list())
            .field("pending", &self.pending_transports_count())
            .field("bridge", &*self.bridge.read())
            .finish()
    }
}

/// Lift an id-like field out of the context as a string
fn take_string(ctx: &mut LogContext, key: &str) -> Option<String> {
    match ctx.remove(key)? {
        FieldValue::String(s) => Some(s),
        FieldValue::Int(i) => Some(i.to_string()),
        FieldValue::Float(f) => Some(f.to_string()),
        FieldValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{sync_transport, ChannelEventBus};
    use crate::redaction::REDACTED;
    use parking_lot::Mutex;

    fn capture(state: &LoggerState) -> Arc<Mutex<Vec<ProcessedLogEntry>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.add_transport(sync_transport("capture", move |entry| {
            sink.lock().push(entry.clone());
            Ok(())
        }));
        seen
    }

    #[test]
    fn test_threshold_suppresses() {
        let state = LoggerState::new();
        let seen = capture(&state);
        let log = state.create_logger("app");

        assert!(log.debug("hidden").is_none());
        assert!(log.info("shown").is_some());
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(state.metrics().suppressed(), 1);
    }

    #[test]
    fn test_reserved_keys_are_lifted_or_dropped() {
        let state = LoggerState::new();
        let log = state.create_logger("app");

        let ctx = LogContext::new()
            .with_field("correlationId", "c-1")
            .with_field("errorCode", "E1")
            .with_field("level", "spoofed")
            .with_field("timestamp", 0)
            .with_field("user", "bob");
        let entry = log.info_with_context("hi", ctx).unwrap();

        assert_eq!(entry.correlation_id.as_deref(), Some("c-1"));
        assert_eq!(entry.error_code.as_deref(), Some("E1"));
        assert_eq!(entry.level, LogLevel::Info);
        assert!(entry.field("level").is_none());
        assert!(entry.field("timestamp").is_none());
        assert_eq!(entry.field("user").unwrap(), "bob");
    }

    #[test]
    fn test_scalar_ids_are_stringified() {
        let state = LoggerState::new();
        let log = state.create_logger("app");

        let ctx = LogContext::new()
            .with_field("correlationId", 42)
            .with_field("errorCode", true);
        let entry = log.info_with_context("hi", ctx).unwrap();
        assert_eq!(entry.correlation_id.as_deref(), Some("42"));
        assert_eq!(entry.error_code.as_deref(), Some("true"));

        let ctx = LogContext::new().with_field("errorCode", vec!["E1", "E2"]);
        let entry = log.info_with_context("hi", ctx).unwrap();
        assert!(entry.error_code.is_none());
        assert!(entry.field("errorCode").is_none());
    }

    #[test]
    fn test_correlation_provider_fallback() {
        let state = LoggerState::new();
        state.configure(ConfigPatch::new().correlation_provider(|| Some("from-provider".into())));
        let log = state.create_logger("app");

        let entry = log.info("hi").unwrap();
        assert_eq!(entry.correlation_id.as_deref(), Some("from-provider"));

        let entry = log
            .info_with_context("hi", LogContext::new().with_field("correlationId", "explicit"))
            .unwrap();
        assert_eq!(entry.correlation_id.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_panicking_provider_is_contained() {
        let state = LoggerState::new();
        state.configure(ConfigPatch::new().correlation_provider(|| panic!("no context")));

        let entry = state.create_logger("app").info("hi").unwrap();
        assert!(entry.correlation_id.is_none());
    }

    #[test]
    fn test_redaction_applies_live_config() {
        let state = LoggerState::new();
        let log = state.create_logger("app");

        let ctx = LogContext::new().with_field("pin", "1234");
        let entry = log.info_with_context("first", ctx.clone()).unwrap();
        assert_eq!(entry.field("pin").unwrap(), "1234");

        state.configure(ConfigPatch::new().add_redact_keys(["pin"]));
        let entry = log.info_with_context("second", ctx).unwrap();
        assert_eq!(entry.field("pin").unwrap(), REDACTED);
    }

    #[test]
    fn test_escalation_respects_flag() {
        let state = LoggerState::new();
        let (bus, events) = ChannelEventBus::unbounded();
        state.set_event_bus(Arc::new(bus));
        let log = state.create_logger("app");

        log.info("not escalated");
        log.warn("escalated");
        assert_eq!(events.try_iter().count(), 1);

        state.configure(ConfigPatch::new().escalate(false));
        log.error("quiet");
        assert_eq!(events.try_iter().count(), 0);
        assert_eq!(state.metrics().escalations(), 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let state = LoggerState::new();
        state.set_log_level(LogLevel::Error);
        capture(&state);

        state.reset_for_tests();

        assert_eq!(state.config().level, LogLevel::Info);
        assert!(state.list_transports().is_empty());
        assert_eq!(state.pending_transports_count(), 0);
    }

    #[test]
    fn test_redaction_errors_are_counted() {
        let state = LoggerState::new();
        state.configure(ConfigPatch::new().add_redact_patterns([
            crate::redaction::RedactPattern::regex("(unclosed"),
        ]));

        let ctx = LogContext::new().with_field("note", "hello");
        let entry = state.create_logger("app").info_with_context("x", ctx).unwrap();

        assert_eq!(entry.field("note").unwrap(), "hello");
        assert!(state.metrics().redaction_errors() >= 1);
    }

    #[test]
    fn test_env_flag_values() {
        std::env::set_var("RRL_TEST_FLAG_ON", "Yes");
        std::env::set_var("RRL_TEST_FLAG_OFF", "0");
        assert!(env_flag("RRL_TEST_FLAG_ON"));
        assert!(!env_flag("RRL_TEST_FLAG_OFF"));
        assert!(!env_flag("RRL_TEST_FLAG_UNSET"));
    }
}
