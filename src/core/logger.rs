//! Namespaced logger handles

use super::{
    log_context::LogContext, log_entry::ProcessedLogEntry, log_level::LogLevel,
    state::LoggerState,
};
use std::fmt;
use std::sync::Arc;

/// Separator between namespace segments
pub const NAMESPACE_SEPARATOR: char = ':';

/// A cheap, cloneable handle that emits through a shared [`LoggerState`]
///
/// Loggers carry only a namespace and a bound context. Level, sampling,
/// redaction and transports are read from the state on every call, so a
/// `configure` applies to loggers created before it.
///
/// Every emitting method returns the processed entry, or `None` when the
/// call was filtered by level or sampling.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{log_context, LoggerState};
///
/// let state = LoggerState::new();
/// let log = state
///     .create_logger("app")
///     .namespace("db")
///     .with(log_context! { "pool" => "primary" });
///
/// let entry = log.info("connected").unwrap();
/// assert_eq!(entry.namespace, "app:db");
/// assert_eq!(entry.field("pool").unwrap(), "primary");
/// ```
#[derive(Clone)]
pub struct Logger {
    state: Arc<LoggerState>,
    namespace: Arc<str>,
    bound: Arc<LogContext>,
}

impl Logger {
    pub fn new(state: Arc<LoggerState>, root: impl Into<String>) -> Self {
        Self {
            state,
            namespace: Arc::from(root.into()),
            bound: Arc::new(LogContext::new()),
        }
    }

    /// Full namespace of this logger, e.g. `app:db:pool`
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// Context attached to every entry from this logger
    pub fn bound_context(&self) -> &LogContext {
        &self.bound
    }

    pub fn state(&self) -> &Arc<LoggerState> {
        &self.state
    }

    /// Derive a child logger named `<parent>:<sub>` sharing this logger's
    /// bound context
    #[must_use]
    pub fn namespace(&self, sub: impl AsRef<str>) -> Logger {
        let sub = sub.as_ref();
        let namespace = if self.namespace.is_empty() {
            sub.to_string()
        } else {
            format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, sub)
        };

        Logger {
            state: Arc::clone(&self.state),
            namespace: Arc::from(namespace),
            bound: Arc::clone(&self.bound),
        }
    }

    /// Derive a logger whose bound context is this one's merged with `ctx`
    ///
    /// Keys in `ctx` win over keys already bound.
    #[must_use]
    pub fn with(&self, ctx: LogContext) -> Logger {
        Logger {
            state: Arc::clone(&self.state),
            namespace: Arc::clone(&self.namespace),
            bound: Arc::new(self.bound.merged(&ctx)),
        }
    }

    /// Log at `level` with an optional call-site context
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: Option<LogContext>,
    ) -> Option<Arc<ProcessedLogEntry>> {
        self.state
            .emit(&self.namespace, &self.bound, level, message.into(), context)
    }

    pub fn debug(&self, message: impl Into<String>) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Debug, message, None)
    }

    pub fn info(&self, message: impl Into<String>) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Info, message, None)
    }

    pub fn warn(&self, message: impl Into<String>) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Warn, message, None)
    }

    pub fn error(&self, message: impl Into<String>) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Error, message, None)
    }

    pub fn debug_with_context(
        &self,
        message: impl Into<String>,
        context: LogContext,
    ) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Debug, message, Some(context))
    }

    pub fn info_with_context(
        &self,
        message: impl Into<String>,
        context: LogContext,
    ) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Info, message, Some(context))
    }

    pub fn warn_with_context(
        &self,
        message: impl Into<String>,
        context: LogContext,
    ) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Warn, message, Some(context))
    }

    pub fn error_with_context(
        &self,
        message: impl Into<String>,
        context: LogContext,
    ) -> Option<Arc<ProcessedLogEntry>> {
        self.log(LogLevel::Error, message, Some(context))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("namespace", &self.namespace)
            .field("bound", &self.bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;

    #[test]
    fn test_namespace_chain() {
        let state = LoggerState::new();
        let log = state.create_logger("app").namespace("http").namespace("router");
        assert_eq!(log.name(), "app:http:router");

        let rootless = state.create_logger("").namespace("worker");
        assert_eq!(rootless.name(), "worker");
    }

    #[test]
    fn test_with_accumulates_and_overrides() {
        let state = LoggerState::new();
        let base = state
            .create_logger("app")
            .with(LogContext::new().with_field("region", "eu").with_field("tier", 1));
        let derived = base.with(LogContext::new().with_field("tier", 2));

        assert_eq!(derived.bound_context().len(), 2);
        assert_eq!(derived.bound_context().get("tier"), Some(&FieldValue::Int(2)));
        assert_eq!(base.bound_context().get("tier"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_call_site_context_wins() {
        let state = LoggerState::new();
        let log = state
            .create_logger("app")
            .with(LogContext::new().with_field("user", "bound"));

        let entry = log
            .info_with_context("hi", LogContext::new().with_field("user", "call"))
            .unwrap();
        assert_eq!(entry.field("user").unwrap(), "call");
    }

    #[test]
    fn test_namespace_keeps_bound_context() {
        let state = LoggerState::new();
        let log = state
            .create_logger("app")
            .with(LogContext::new().with_field("requestId", "r-1"))
            .namespace("db");

        let entry = log.warn("slow query").unwrap();
        assert_eq!(entry.namespace, "app:db");
        assert_eq!(entry.field("requestId").unwrap(), "r-1");
    }

    #[test]
    fn test_loggers_share_live_config() {
        let state = LoggerState::new();
        let early = state.create_logger("early");

        state.set_log_level(LogLevel::Error);
        assert!(early.warn("filtered").is_none());
        assert!(early.error("kept").is_some());
    }
}
