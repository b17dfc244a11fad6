//! Output format configuration for log entries
//!
//! Provides different output formats for processed entries:
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools

use super::log_entry::ProcessedLogEntry;
use serde_json::{Map, Value};

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `[info] app:api: Request processed user="alice"`
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"level":"info","msg":"Request processed","namespace":"app:api",...}`
    Json,

    /// Logfmt format (key=value pairs)
    ///
    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=info namespace=app:api msg="Request processed"`
    Logfmt,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Format a log entry according to this output format
    pub fn format(&self, entry: &ProcessedLogEntry) -> String {
        match self {
            OutputFormat::Text => self.format_text(entry),
            OutputFormat::Json => self.format_json(entry),
            OutputFormat::Logfmt => self.format_logfmt(entry),
        }
    }

    /// Format as single-line human-readable text
    fn format_text(&self, entry: &ProcessedLogEntry) -> String {
        let mut line = format!(
            "[{}] {}: {}",
            entry.level,
            entry.namespace,
            escape_control(&entry.message)
        );

        for (key, value) in envelope_fields(entry) {
            line.push(' ');
            line.push_str(&key);
            line.push('=');
            line.push_str(&escape_control(&value_text(&value)));
        }

        line
    }

    /// Format as JSON with the message under `msg`
    fn format_json(&self, entry: &ProcessedLogEntry) -> String {
        let mut json_obj = Map::new();

        json_obj.insert("timestamp".into(), Value::String(entry.timestamp.clone()));
        json_obj.insert("level".into(), Value::String(entry.level.to_str().into()));
        json_obj.insert("namespace".into(), Value::String(entry.namespace.clone()));
        json_obj.insert("msg".into(), Value::String(entry.message.clone()));

        for (key, value) in envelope_fields(entry) {
            json_obj.entry(key).or_insert(value);
        }

        serde_json::to_string(&Value::Object(json_obj)).unwrap_or_default()
    }

    /// Format as logfmt (key=value pairs)
    fn format_logfmt(&self, entry: &ProcessedLogEntry) -> String {
        let mut parts = vec![
            format!("timestamp={}", self.escape_logfmt_value(&entry.timestamp)),
            format!("level={}", entry.level.to_str()),
            format!("namespace={}", self.escape_logfmt_value(&entry.namespace)),
            // always quoted for safety
            format!("msg={}", self.quote_logfmt_value(&entry.message)),
        ];

        for (key, value) in envelope_fields(entry) {
            let formatted_value = match &value {
                Value::String(s) => self.quote_logfmt_value(s),
                Value::Array(_) | Value::Object(_) => self.quote_logfmt_value(&value.to_string()),
                other => other.to_string(),
            };
            parts.push(format!("{}={}", self.escape_logfmt_key(&key), formatted_value));
        }

        parts.join(" ")
    }

    /// Escape a logfmt key (remove spaces and special chars)
    fn escape_logfmt_key(&self, key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect()
    }

    /// Escape a logfmt value (quote if contains spaces)
    fn escape_logfmt_value(&self, value: &str) -> String {
        if value.contains(' ') || value.contains('"') || value.contains('=') {
            self.quote_logfmt_value(value)
        } else {
            value.to_string()
        }
    }

    fn quote_logfmt_value(&self, value: &str) -> String {
        format!(
            "\"{}\"",
            escape_control(&value.replace('\\', "\\\\").replace('"', "\\\""))
        )
    }
}

/// Correlation id, error code and context fields, in that order
fn envelope_fields(entry: &ProcessedLogEntry) -> Vec<(String, Value)> {
    let mut fields = Vec::with_capacity(entry.fields.len() + 2);
    if let Some(id) = &entry.correlation_id {
        fields.push(("correlationId".to_string(), Value::String(id.clone())));
    }
    if let Some(code) = &entry.error_code {
        fields.push(("errorCode".to_string(), Value::String(code.clone())));
    }
    fields.extend(entry.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    fields
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep one entry on one line
fn escape_control(s: &str) -> String {
    if !s.contains(|c: char| matches!(c, '\n' | '\r' | '\t')) {
        return s.to_string();
    }
    s.replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t")
}
