//! Processed log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context keys that name structural entry fields and never come from context
pub const RESERVED_KEYS: &[&str] = &[
    "timestamp",
    "namespace",
    "level",
    "message",
    "correlationId",
    "errorCode",
];

/// A fully assembled, already-redacted log entry
///
/// Built once per accepted emission and shared with every transport as
/// `Arc<ProcessedLogEntry>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLogEntry {
    /// ISO-8601 UTC timestamp with millisecond precision
    pub timestamp: String,
    pub namespace: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Redacted context fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProcessedLogEntry {
    pub fn new(
        namespace: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            timestamp: format_timestamp(&Utc::now()),
            namespace: namespace.into(),
            level,
            message: message.into(),
            correlation_id: None,
            error_code: None,
            fields,
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    #[must_use]
    pub fn with_error_code(mut self, error_code: Option<String>) -> Self {
        self.error_code = error_code;
        self
    }

    /// Look up a redacted context field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Serialize to a single-line JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Render a timestamp the way entries carry it, e.g. `2025-01-08T10:30:45.123Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
