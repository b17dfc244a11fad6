//! Process-wide logger facade
//!
//! Thin free functions over one lazily created [`LoggerState`]. The state
//! reads [`STDOUT_JSON_ENV`](crate::STDOUT_JSON_ENV) once, on first use.

use crate::core::{
    ConfigPatch, EventBus, LogLevel, Logger, LoggerConfig, LoggerState, TransportHandle,
};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static GLOBAL: OnceLock<Arc<LoggerState>> = OnceLock::new();

/// The shared process-wide state
pub fn global() -> &'static Arc<LoggerState> {
    GLOBAL.get_or_init(LoggerState::from_env)
}

/// Create a logger on the global state
///
/// # Example
///
/// ```
/// let log = rust_redacting_logger::create_logger("billing");
/// log.info("invoice sent");
/// ```
pub fn create_logger(root: impl Into<String>) -> Logger {
    global().create_logger(root)
}

pub fn configure_logger(patch: ConfigPatch) {
    global().configure(patch);
}

pub fn set_log_level(level: LogLevel) {
    global().set_log_level(level);
}

pub fn get_logger_config() -> Arc<LoggerConfig> {
    global().config()
}

pub fn add_log_transport(transport: impl Into<TransportHandle>) -> bool {
    global().add_transport(transport)
}

pub fn clear_log_transports() {
    global().clear_transports();
}

pub fn list_log_transports() -> Vec<TransportHandle> {
    global().list_transports()
}

/// Wait for in-flight async transports; see [`LoggerState::drain`]
pub async fn drain_logs(timeout: Option<Duration>) -> bool {
    global().drain(timeout).await
}

pub fn get_pending_log_transports_count() -> usize {
    global().pending_transports_count()
}

pub fn set_event_bus(bus: Arc<dyn EventBus>) {
    global().set_event_bus(bus);
}

pub fn reset_logger_for_tests() {
    global().reset_for_tests();
}
