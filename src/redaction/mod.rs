//! Sensitive-data redaction for log values
//!
//! Values are walked depth-first. Keys listed in the redaction set are
//! masked without descending into them, string leaves are passed through
//! every configured pattern, aliased nodes that loop back onto the current
//! path become [`CIRCULAR`], and anything deeper than the configured limit
//! becomes [`TRUNCATED`].

pub mod pattern;
pub mod redactor;

pub use pattern::RedactPattern;
pub use redactor::{RedactionErrorCallback, RedactionOptions, Redactor};

use crate::core::log_context::FieldValue;

/// Replacement for masked keys and pattern matches
pub const REDACTED: &str = "***REDACTED***";

/// Replacement for a node that refers back to one of its ancestors
pub const CIRCULAR: &str = "[Circular]";

/// Replacement for subtrees beyond the depth limit
pub const TRUNCATED: &str = "[Truncated]";

pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Keys masked out of the box
pub const DEFAULT_REDACT_KEYS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "accessToken",
    "refreshToken",
    "apiKey",
    "api_key",
    "authorization",
    "cookie",
    "clientSecret",
    "creditCard",
    "cardNumber",
    "cvv",
    "ssn",
];

/// Patterns applied out of the box: bearer credentials
pub fn default_patterns() -> Vec<RedactPattern> {
    vec![RedactPattern::regex(r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*")]
}

/// Redact `value` with one-off options
pub fn redact(value: &FieldValue, options: &RedactionOptions) -> serde_json::Value {
    Redactor::new(options.clone()).redact(value)
}

/// Redact `value` and render it as key-order-independent JSON
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{redact_to_string, FieldValue, LogContext, RedactionOptions};
///
/// let a = LogContext::new().with_field("b", 1).with_field("a", 2);
/// let b = LogContext::new().with_field("a", 2).with_field("b", 1);
/// let opts = RedactionOptions::default();
///
/// assert_eq!(
///     redact_to_string(&FieldValue::Map(a), &opts),
///     redact_to_string(&FieldValue::Map(b), &opts),
/// );
/// ```
pub fn redact_to_string(value: &FieldValue, options: &RedactionOptions) -> String {
    Redactor::new(options.clone()).redact_to_string(value)
}
