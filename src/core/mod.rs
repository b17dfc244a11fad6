//! Core logger types and traits

pub mod async_transport;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod escalation;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod pending;
pub mod sampling;
pub mod state;
pub mod transport;

pub use async_transport::{async_transport, AsyncFnTransport, AsyncTransport};
pub use config::{ConfigPatch, CorrelationProvider, LoggerConfig, TransportErrorCallback};
pub use dispatcher::TransportDispatcher;
pub use error::{LoggerError, RedactionError, Result, LOG_TRANSPORT_TIMEOUT};
pub use escalation::{
    BusEvent, ChannelEventBus, EscalationBridge, EscalationPayload, EventBus,
    TransportFailurePayload, ESCALATED_EVENT, TRANSPORT_FAILURE_EVENT,
};
pub use log_context::{FieldValue, LogContext, SharedValue};
pub use log_entry::{format_timestamp, ProcessedLogEntry, RESERVED_KEYS};
pub use log_level::LogLevel;
pub use logger::{Logger, NAMESPACE_SEPARATOR};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use pending::{PendingSet, DEFAULT_DRAIN_TIMEOUT};
pub use sampling::{LogSampler, SamplerMetrics};
pub use state::{LoggerState, STDOUT_JSON_ENV};
pub use transport::{sync_transport, FnTransport, Transport, TransportHandle};
