//! Escalation of warn/error entries and transport failures to an event bus
//!
//! The bus is an external collaborator. The logger only publishes; when no
//! bus is attached, publishing is a no-op.

use super::error::{call_guarded, LoggerError};
use super::log_entry::ProcessedLogEntry;
use super::log_level::LogLevel;
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Event name for escalated entries
pub const ESCALATED_EVENT: &str = "log.escalated";

/// Event name for transport failures
pub const TRANSPORT_FAILURE_EVENT: &str = "log.transport.failure";

/// Publish-only event bus
pub trait EventBus: Send + Sync {
    fn publish(&self, event: BusEvent);
}

impl<F> EventBus for F
where
    F: Fn(BusEvent) + Send + Sync,
{
    fn publish(&self, event: BusEvent) {
        self(event)
    }
}

/// Events the logger publishes
///
/// Serializes as `{"type": "<event name>", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum BusEvent {
    #[serde(rename = "log.escalated")]
    Escalated(EscalationPayload),
    #[serde(rename = "log.transport.failure")]
    TransportFailure(TransportFailurePayload),
}

impl BusEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BusEvent::Escalated(_) => ESCALATED_EVENT,
            BusEvent::TransportFailure(_) => TRANSPORT_FAILURE_EVENT,
        }
    }
}

/// Payload of [`ESCALATED_EVENT`]; absent ids serialize as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationPayload {
    pub level: LogLevel,
    pub namespace: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub error_code: Option<String>,
}

impl From<&ProcessedLogEntry> for EscalationPayload {
    fn from(entry: &ProcessedLogEntry) -> Self {
        Self {
            level: entry.level,
            namespace: entry.namespace.clone(),
            message: entry.message.clone(),
            correlation_id: entry.correlation_id.clone(),
            error_code: entry.error_code.clone(),
        }
    }
}

/// Payload of [`TRANSPORT_FAILURE_EVENT`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportFailurePayload {
    pub message: String,
    pub code: String,
    pub transport: String,
}

impl TransportFailurePayload {
    pub fn new(transport: &str, err: &LoggerError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code().to_string(),
            transport: transport.to_string(),
        }
    }
}

/// Optional bus connection used by the emit and dispatch paths
#[derive(Clone, Default)]
pub struct EscalationBridge {
    bus: Option<Arc<dyn EventBus>>,
}

impl EscalationBridge {
    pub fn new(bus: Option<Arc<dyn EventBus>>) -> Self {
        Self { bus }
    }

    pub fn is_connected(&self) -> bool {
        self.bus.is_some()
    }

    /// Publish `log.escalated` for an entry
    ///
    /// Returns whether the event reached a bus without the bus panicking.
    pub fn escalate(&self, entry: &ProcessedLogEntry) -> bool {
        self.publish(BusEvent::Escalated(EscalationPayload::from(entry)))
    }

    /// Publish `log.transport.failure`
    pub fn transport_failure(&self, transport: &str, err: &LoggerError) -> bool {
        self.publish(BusEvent::TransportFailure(TransportFailurePayload::new(
            transport, err,
        )))
    }

    fn publish(&self, event: BusEvent) -> bool {
        match &self.bus {
            Some(bus) => call_guarded("event bus", || bus.publish(event)).is_some(),
            None => false,
        }
    }
}

impl fmt::Debug for EscalationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscalationBridge")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Event bus backed by an unbounded crossbeam channel
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{BusEvent, ChannelEventBus, EventBus, LoggerState};
/// use std::sync::Arc;
///
/// let state = LoggerState::new();
/// let (bus, events) = ChannelEventBus::unbounded();
/// state.set_event_bus(Arc::new(bus));
///
/// state.create_logger("billing").error("charge failed");
///
/// let event = events.try_recv().unwrap();
/// assert_eq!(event.name(), "log.escalated");
/// ```
#[derive(Debug, Clone)]
pub struct ChannelEventBus {
    sender: Sender<BusEvent>,
}

impl ChannelEventBus {
    pub fn unbounded() -> (Self, Receiver<BusEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventBus for ChannelEventBus {
    fn publish(&self, event: BusEvent) {
        // a dropped receiver just means nobody is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::time::Duration;

    fn entry(level: LogLevel) -> ProcessedLogEntry {
        ProcessedLogEntry::new("payments", level, "card declined", Map::new())
    }

    #[test]
    fn test_escalated_event_shape() {
        let event = BusEvent::Escalated(EscalationPayload::from(&entry(LogLevel::Error)));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "log.escalated",
                "payload": {
                    "level": "error",
                    "namespace": "payments",
                    "message": "card declined",
                    "correlationId": null,
                    "errorCode": null
                }
            })
        );
    }

    #[test]
    fn test_transport_failure_payload() {
        let err = LoggerError::transport_timeout("slow", Duration::from_millis(15));
        let payload = TransportFailurePayload::new("slow", &err);

        assert_eq!(payload.code, "LOG_TRANSPORT_TIMEOUT");
        assert_eq!(payload.transport, "slow");
        assert!(payload.message.contains("timeout after 15ms"));
    }

    #[test]
    fn test_bridge_without_bus() {
        let bridge = EscalationBridge::default();
        assert!(!bridge.is_connected());
        assert!(!bridge.escalate(&entry(LogLevel::Warn)));
    }

    #[test]
    fn test_bridge_publishes_to_channel() {
        let (bus, rx) = ChannelEventBus::unbounded();
        let bridge = EscalationBridge::new(Some(Arc::new(bus)));

        assert!(bridge.escalate(&entry(LogLevel::Warn)));
        assert!(bridge.transport_failure("http", &LoggerError::transport("http", "503")));

        assert_eq!(rx.try_recv().unwrap().name(), ESCALATED_EVENT);
        assert_eq!(rx.try_recv().unwrap().name(), TRANSPORT_FAILURE_EVENT);
    }

    #[test]
    fn test_closure_bus_and_panicking_bus() {
        let bridge = EscalationBridge::new(Some(Arc::new(|_event: BusEvent| {
            panic!("bus down");
        })));
        assert!(!bridge.escalate(&entry(LogLevel::Error)));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (bus, rx) = ChannelEventBus::unbounded();
        drop(rx);
        bus.publish(BusEvent::Escalated(EscalationPayload::from(&entry(
            LogLevel::Error,
        ))));
    }
}
