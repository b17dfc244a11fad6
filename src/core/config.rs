//! Live logger configuration and partial updates

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use crate::redaction::{
    default_patterns, RedactPattern, RedactionErrorCallback, RedactionOptions,
    DEFAULT_MAX_DEPTH, DEFAULT_REDACT_KEYS,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Callback for transport failures (errors, panics, timeouts)
pub type TransportErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Supplies a correlation id when the call site does not
pub type CorrelationProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Process-wide logger configuration
///
/// Snapshots are immutable; updates go through [`ConfigPatch`] and take
/// effect for the next emission.
#[derive(Clone)]
pub struct LoggerConfig {
    /// Minimum level that is emitted
    pub level: LogLevel,
    /// Per-level keep probability; missing levels keep everything
    pub sampling: HashMap<LogLevel, f64>,
    /// Keys masked wholesale, compared case-insensitively
    pub redact_keys: Vec<String>,
    pub redact_patterns: Vec<RedactPattern>,
    pub max_depth: usize,
    /// Publish warn/error entries on the event bus
    pub escalate: bool,
    /// Console fallback renders JSON instead of text
    pub json: bool,
    pub transport_timeout: Option<Duration>,
    pub correlation_provider: Option<CorrelationProvider>,
    pub on_transport_error: Option<TransportErrorCallback>,
    pub on_redaction_error: Option<RedactionErrorCallback>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            sampling: HashMap::new(),
            redact_keys: DEFAULT_REDACT_KEYS.iter().map(|k| k.to_string()).collect(),
            redact_patterns: default_patterns(),
            max_depth: DEFAULT_MAX_DEPTH,
            escalate: true,
            json: false,
            transport_timeout: None,
            correlation_provider: None,
            on_transport_error: None,
            on_redaction_error: None,
        }
    }
}

impl LoggerConfig {
    /// Keep probability for `level`
    pub fn sample_rate(&self, level: LogLevel) -> f64 {
        self.sampling.get(&level).copied().unwrap_or(1.0)
    }

    /// Whether `key` is masked (case-insensitive)
    pub fn is_redact_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.redact_keys.iter().any(|k| k.to_lowercase() == key)
    }

    pub fn redaction_options(&self) -> RedactionOptions {
        RedactionOptions {
            redact_keys: self.redact_keys.clone(),
            patterns: self.redact_patterns.clone(),
            max_depth: self.max_depth,
            on_error: self.on_redaction_error.clone(),
        }
    }

    fn add_redact_key(&mut self, key: String) {
        if !self.is_redact_key(&key) {
            self.redact_keys.push(key);
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("level", &self.level)
            .field("sampling", &self.sampling)
            .field("redact_keys", &self.redact_keys)
            .field("redact_patterns", &self.redact_patterns)
            .field("max_depth", &self.max_depth)
            .field("escalate", &self.escalate)
            .field("json", &self.json)
            .field("transport_timeout", &self.transport_timeout)
            .field("correlation_provider", &self.correlation_provider.is_some())
            .field("on_transport_error", &self.on_transport_error.is_some())
            .field("on_redaction_error", &self.on_redaction_error.is_some())
            .finish()
    }
}

/// Partial configuration update
///
/// Unset fields leave the live value untouched. `sampling` merges per level,
/// `add_*` lists append, and the plain list fields replace. Values are not
/// validated on apply; call [`validate`](Self::validate) to opt in.
///
/// Deserializes from camelCase JSON (callbacks excluded).
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{ConfigPatch, LogLevel, LoggerConfig};
///
/// let mut config = LoggerConfig::default();
/// ConfigPatch::new()
///     .level(LogLevel::Debug)
///     .sample(LogLevel::Debug, 0.25)
///     .add_redact_keys(["secretSauce"])
///     .apply_to(&mut config);
///
/// assert_eq!(config.level, LogLevel::Debug);
/// assert!(config.is_redact_key("SECRETSAUCE"));
/// assert!(config.is_redact_key("password"));
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub level: Option<LogLevel>,
    pub sampling: Option<HashMap<LogLevel, f64>>,
    pub redact_keys: Option<Vec<String>>,
    pub add_redact_keys: Vec<String>,
    pub redact_patterns: Option<Vec<RedactPattern>>,
    pub add_redact_patterns: Vec<RedactPattern>,
    pub max_depth: Option<usize>,
    pub escalate: Option<bool>,
    pub json: Option<bool>,
    pub transport_timeout_ms: Option<u64>,
    #[serde(skip)]
    pub correlation_provider: Option<CorrelationProvider>,
    #[serde(skip)]
    pub on_transport_error: Option<TransportErrorCallback>,
    #[serde(skip)]
    pub on_redaction_error: Option<RedactionErrorCallback>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the keep probability for one level
    #[must_use = "builder methods return a new value"]
    pub fn sample(mut self, level: LogLevel, rate: f64) -> Self {
        self.sampling.get_or_insert_with(HashMap::new).insert(level, rate);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, rates: HashMap<LogLevel, f64>) -> Self {
        self.sampling.get_or_insert_with(HashMap::new).extend(rates);
        self
    }

    /// Replace the redaction key set
    #[must_use = "builder methods return a new value"]
    pub fn redact_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Append to the redaction key set
    #[must_use = "builder methods return a new value"]
    pub fn add_redact_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_redact_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Replace the pattern list
    #[must_use = "builder methods return a new value"]
    pub fn redact_patterns<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<RedactPattern>,
    {
        self.redact_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Append to the pattern list
    #[must_use = "builder methods return a new value"]
    pub fn add_redact_patterns<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<RedactPattern>,
    {
        self.add_redact_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn escalate(mut self, escalate: bool) -> Self {
        self.escalate = Some(escalate);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn transport_timeout(mut self, timeout: Duration) -> Self {
        self.transport_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn correlation_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.correlation_provider = Some(Arc::new(provider));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_transport_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        self.on_transport_error = Some(Arc::new(callback));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_redaction_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&crate::core::error::RedactionError) + Send + Sync + 'static,
    {
        self.on_redaction_error = Some(Arc::new(callback));
        self
    }

    /// Merge this patch into `config`
    pub fn apply_to(self, config: &mut LoggerConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(rates) = self.sampling {
            config.sampling.extend(rates);
        }
        if let Some(keys) = self.redact_keys {
            config.redact_keys.clear();
            for key in keys {
                config.add_redact_key(key);
            }
        }
        for key in self.add_redact_keys {
            config.add_redact_key(key);
        }
        if let Some(patterns) = self.redact_patterns {
            config.redact_patterns = patterns;
        }
        config.redact_patterns.extend(self.add_redact_patterns);
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(escalate) = self.escalate {
            config.escalate = escalate;
        }
        if let Some(json) = self.json {
            config.json = json;
        }
        if let Some(ms) = self.transport_timeout_ms {
            config.transport_timeout = Some(Duration::from_millis(ms));
        }
        if self.correlation_provider.is_some() {
            config.correlation_provider = self.correlation_provider;
        }
        if self.on_transport_error.is_some() {
            config.on_transport_error = self.on_transport_error;
        }
        if self.on_redaction_error.is_some() {
            config.on_redaction_error = self.on_redaction_error;
        }
    }

    /// Strict checks that `apply_to` deliberately skips
    pub fn validate(&self) -> Result<()> {
        if let Some(ref rates) = self.sampling {
            for (level, rate) in rates {
                if !(0.0..=1.0).contains(rate) {
                    return Err(LoggerError::config(
                        "sampling",
                        format!("rate for {} must be within [0, 1], got {}", level, rate),
                    ));
                }
            }
        }
        if self.max_depth == Some(0) {
            return Err(LoggerError::config("max_depth", "must be at least 1"));
        }
        if self.transport_timeout_ms == Some(0) {
            return Err(LoggerError::config(
                "transport_timeout",
                "must be greater than zero",
            ));
        }
        for pattern in self
            .redact_patterns
            .iter()
            .flatten()
            .chain(self.add_redact_patterns.iter())
        {
            if let Err(err) = pattern.compile() {
                return Err(LoggerError::config("redact_patterns", err.to_string()));
            }
        }
        Ok(())
    }
}
