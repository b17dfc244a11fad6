//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. An optional
//! braced `key => value` list before the format string attaches call-site
//! context.
//!
//! # Examples
//!
//! ```
//! use rust_redacting_logger::prelude::*;
//! use rust_redacting_logger::info;
//!
//! let state = LoggerState::new();
//! let logger = state.create_logger("server");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With context; sensitive keys are masked before any transport sees them
//! info!(logger, { "user" => "alice", "password" => "hunter2" }, "User {} logged in", 42);
//! ```

/// Build a [`LogContext`](crate::LogContext) from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use rust_redacting_logger::log_context;
///
/// let ctx = log_context! { "requestId" => "r-1", "attempt" => 3 };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! log_context {
    () => {
        $crate::LogContext::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut ctx = $crate::LogContext::new();
        $( ctx.insert($key, $value); )+
        ctx
    }};
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_redacting_logger::prelude::*;
/// # let state = LoggerState::new();
/// # let logger = state.create_logger("app");
/// use rust_redacting_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, { "errorCode" => "E_DISK" }, "Disk at {}%", 91);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), Some($crate::log_context!($($key => $value),*)))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), None)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_redacting_logger::prelude::*;
/// # let state = LoggerState::new();
/// # state.set_log_level(LogLevel::Debug);
/// # let logger = state.create_logger("app");
/// use rust_redacting_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_redacting_logger::prelude::*;
/// # let state = LoggerState::new();
/// # let logger = state.create_logger("app");
/// use rust_redacting_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_redacting_logger::prelude::*;
/// # let state = LoggerState::new();
/// # let logger = state.create_logger("app");
/// use rust_redacting_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_redacting_logger::prelude::*;
/// # let state = LoggerState::new();
/// # let logger = state.create_logger("app");
/// use rust_redacting_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, { "errorCode" => "E_DB" }, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, LoggerState};
    use crate::redaction::REDACTED;
    use crate::transports::CaptureTransport;

    fn setup() -> (std::sync::Arc<LoggerState>, CaptureTransport) {
        let state = LoggerState::new();
        state.set_log_level(LogLevel::Debug);
        let capture = CaptureTransport::new();
        state.add_transport(capture.handle());
        (state, capture)
    }

    #[test]
    fn test_log_macro() {
        let (state, capture) = setup();
        let logger = state.create_logger("m");
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);

        assert_eq!(capture.messages(), vec!["Test message", "Formatted: 42"]);
    }

    #[test]
    fn test_level_macros() {
        let (state, capture) = setup();
        let logger = state.create_logger("m");
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        assert_eq!(capture.count_at(LogLevel::Debug), 1);
        assert_eq!(capture.count_at(LogLevel::Info), 1);
        assert_eq!(capture.count_at(LogLevel::Warn), 1);
        assert_eq!(capture.count_at(LogLevel::Error), 1);
    }

    #[test]
    fn test_context_form() {
        let (state, capture) = setup();
        let logger = state.create_logger("m");
        info!(logger, { "user" => "alice", "token" => "abc" }, "login {}", "ok");

        let entry = capture.last().unwrap();
        assert_eq!(entry.message, "login ok");
        assert_eq!(entry.field("user").unwrap(), "alice");
        assert_eq!(entry.field("token").unwrap(), REDACTED);
    }

    #[test]
    fn test_log_context_macro() {
        let empty = log_context!();
        assert!(empty.is_empty());

        let ctx = log_context! { "a" => 1, "b" => "two", };
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("b").and_then(|v| v.as_str()), Some("two"));
    }
}
