//! Error types for the logging pipeline

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Stable code attached to transport timeouts
pub const LOG_TRANSPORT_TIMEOUT: &str = "LOG_TRANSPORT_TIMEOUT";

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A transport returned an error
    #[error("Transport '{transport}' failed: {message}")]
    TransportFailed { transport: String, message: String },

    /// A transport panicked while handling an entry
    #[error("Transport '{transport}' panicked: {message}")]
    TransportPanicked { transport: String, message: String },

    /// An async transport did not settle in time
    #[error("Transport '{transport}' timeout after {}ms", .timeout.as_millis())]
    TransportTimeout { transport: String, timeout: Duration },

    /// An async transport was registered but no tokio runtime was available
    #[error("Transport '{transport}' requires a tokio runtime but none is running")]
    NoRuntime { transport: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a transport failure error
    pub fn transport(transport: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportFailed {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create a transport panic error
    pub fn transport_panic(transport: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportPanicked {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create a transport timeout error
    pub fn transport_timeout(transport: impl Into<String>, timeout: Duration) -> Self {
        LoggerError::TransportTimeout {
            transport: transport.into(),
            timeout,
        }
    }

    /// Create a missing-runtime error
    pub fn no_runtime(transport: impl Into<String>) -> Self {
        LoggerError::NoRuntime {
            transport: transport.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            LoggerError::TransportFailed { .. } => "LOG_TRANSPORT_FAILED",
            LoggerError::TransportPanicked { .. } => "LOG_TRANSPORT_PANIC",
            LoggerError::TransportTimeout { .. } => LOG_TRANSPORT_TIMEOUT,
            LoggerError::NoRuntime { .. } => "LOG_NO_RUNTIME",
            LoggerError::InvalidConfiguration { .. } => "LOG_INVALID_CONFIG",
            LoggerError::IoError(_) => "LOG_IO",
            LoggerError::JsonError(_) => "LOG_JSON",
            LoggerError::Other(_) => "LOG_ERROR",
        }
    }
}

/// Failure raised while evaluating a redaction rule against a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedactionError {
    /// A regular-expression pattern could not be compiled
    #[error("Invalid redaction pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl RedactionError {
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        RedactionError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run a user-supplied hook, containing any panic it raises
///
/// Returns `None` if the hook panicked.
pub(crate) fn call_guarded<R>(hook: &str, f: impl FnOnce() -> R) -> Option<R> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(panic_info) => {
            eprintln!(
                "[LOGGER ERROR] {} hook panicked: {}",
                hook,
                panic_message(panic_info.as_ref())
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }

    #[test]
    fn test_error_creation() {
        let err = LoggerError::transport("http", "connection refused");
        assert!(matches!(err, LoggerError::TransportFailed { .. }));

        let err = LoggerError::config("sampling", "rate out of range");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::transport_timeout("slow", Duration::from_millis(15));
        assert_eq!(err.to_string(), "Transport 'slow' timeout after 15ms");

        let err = LoggerError::transport("http", "503");
        assert_eq!(err.to_string(), "Transport 'http' failed: 503");

        let err = RedactionError::invalid_pattern("(", "unclosed group");
        assert_eq!(
            err.to_string(),
            "Invalid redaction pattern '(': unclosed group"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LoggerError::transport_timeout("t", Duration::from_millis(1)).code(),
            "LOG_TRANSPORT_TIMEOUT"
        );
        assert_eq!(LoggerError::transport("t", "x").code(), "LOG_TRANSPORT_FAILED");
        assert_eq!(LoggerError::transport_panic("t", "x").code(), "LOG_TRANSPORT_PANIC");
        assert_eq!(LoggerError::no_runtime("t").code(), "LOG_NO_RUNTIME");
    }
}
