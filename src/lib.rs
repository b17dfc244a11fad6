//! # Rust Redacting Logger
//!
//! A structured logging pipeline that masks sensitive data before any
//! output sees it.
//!
//! ## Features
//!
//! - **Redaction**: Key-based masking, string patterns, cycle and depth safety
//! - **Namespaced Loggers**: Cheap handles with bound context and live config
//! - **Transports**: Ordered sync sinks plus tracked async sinks with timeouts
//! - **Escalation**: Warn and error entries re-published on an event bus
//! - **Bounded Drain**: Wait for in-flight async delivery before shutdown
//!
//! ## Example
//!
//! ```
//! use rust_redacting_logger::prelude::*;
//! use rust_redacting_logger::transports::CaptureTransport;
//!
//! let state = LoggerState::new();
//! let capture = CaptureTransport::new();
//! state.add_transport(capture.handle());
//!
//! let log = state.create_logger("auth");
//! log.info_with_context(
//!     "login",
//!     LogContext::new()
//!         .with_field("user", "alice")
//!         .with_field("password", "hunter2"),
//! );
//!
//! let entry = capture.last().unwrap();
//! assert_eq!(entry.field("password").unwrap(), "***REDACTED***");
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod redaction;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        async_transport, sync_transport, AsyncTransport, BusEvent, ConfigPatch, EventBus,
        FieldValue, LogContext, LogLevel, Logger, LoggerConfig, LoggerError, LoggerMetrics,
        LoggerState, OutputFormat, ProcessedLogEntry, Result, SharedValue, Transport,
        TransportHandle,
    };
    pub use crate::global::{
        add_log_transport, configure_logger, create_logger, drain_logs, set_log_level,
    };
    pub use crate::transports::ConsoleTransport;
}

pub use crate::core::{
    async_transport, format_timestamp, sync_transport, AsyncFnTransport, AsyncTransport,
    BusEvent, ChannelEventBus, ConfigPatch, CorrelationProvider, EscalationBridge,
    EscalationPayload, EventBus, FieldValue, FnTransport, LogContext, LogLevel, LogSampler,
    Logger, LoggerConfig, LoggerError, LoggerMetrics, LoggerState, OutputFormat, PendingSet,
    ProcessedLogEntry, RedactionError, Result, SamplerMetrics, SharedValue, Transport,
    TransportDispatcher, TransportErrorCallback, TransportFailurePayload, TransportHandle,
    DEFAULT_DRAIN_TIMEOUT, ESCALATED_EVENT, LOG_TRANSPORT_TIMEOUT, NAMESPACE_SEPARATOR,
    RESERVED_KEYS, STDOUT_JSON_ENV, TRANSPORT_FAILURE_EVENT,
};
pub use global::{
    add_log_transport, clear_log_transports, configure_logger, create_logger, drain_logs,
    get_logger_config, get_pending_log_transports_count, global, list_log_transports,
    reset_logger_for_tests, set_event_bus, set_log_level,
};
pub use redaction::{
    redact, redact_to_string, RedactPattern, RedactionErrorCallback, RedactionOptions, Redactor,
    CIRCULAR, REDACTED, TRUNCATED,
};
pub use transports::{CaptureTransport, ConsoleTransport};
