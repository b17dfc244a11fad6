//! Depth-first value redaction

use super::pattern::{Matcher, RedactPattern};
use super::{CIRCULAR, DEFAULT_MAX_DEPTH, DEFAULT_REDACT_KEYS, REDACTED, TRUNCATED};
use crate::core::error::{call_guarded, RedactionError};
use crate::core::log_context::{FieldValue, LogContext};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

/// Callback invoked when a redaction rule cannot be evaluated
pub type RedactionErrorCallback = Arc<dyn Fn(&RedactionError) + Send + Sync>;

/// Redaction rules before compilation
#[derive(Clone)]
pub struct RedactionOptions {
    /// Keys whose values are masked wholesale (matched case-insensitively)
    pub redact_keys: Vec<String>,
    /// Patterns applied to every string leaf, in order
    pub patterns: Vec<RedactPattern>,
    /// Nodes deeper than this are replaced by the truncation marker
    pub max_depth: usize,
    pub on_error: Option<RedactionErrorCallback>,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            redact_keys: DEFAULT_REDACT_KEYS.iter().map(|k| k.to_string()).collect(),
            patterns: super::default_patterns(),
            max_depth: DEFAULT_MAX_DEPTH,
            on_error: None,
        }
    }
}

impl fmt::Debug for RedactionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactionOptions")
            .field("redact_keys", &self.redact_keys)
            .field("patterns", &self.patterns)
            .field("max_depth", &self.max_depth)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Compiled redaction rules
///
/// Never panics and never mutates its input; every call returns a fresh
/// `serde_json::Value` tree.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{FieldValue, LogContext, RedactionOptions, Redactor};
///
/// let redactor = Redactor::new(RedactionOptions::default());
/// let ctx = LogContext::new()
///     .with_field("user", "alice")
///     .with_field("Password", "hunter2");
///
/// let out = redactor.redact(&FieldValue::Map(ctx));
/// assert_eq!(out["user"], "alice");
/// assert_eq!(out["Password"], "***REDACTED***");
/// ```
pub struct Redactor {
    keys: HashSet<String>,
    matchers: Vec<Result<Matcher, RedactionError>>,
    max_depth: usize,
    on_error: Option<RedactionErrorCallback>,
}

impl Redactor {
    pub fn new(options: RedactionOptions) -> Self {
        Self {
            keys: options
                .redact_keys
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            matchers: options.patterns.iter().map(RedactPattern::compile).collect(),
            max_depth: options.max_depth,
            on_error: options.on_error,
        }
    }

    /// Redact an arbitrary value tree
    pub fn redact(&self, value: &FieldValue) -> Value {
        Walk::new(self).value(value, 0)
    }

    /// Redact a context, yielding the top-level object's fields
    pub fn redact_context(&self, ctx: &LogContext) -> Map<String, Value> {
        Walk::new(self).map(ctx, 0)
    }

    /// Apply every pattern to a bare string
    ///
    /// If any pattern cannot be evaluated the error hook fires and the input
    /// is returned unchanged.
    pub fn redact_str(&self, input: &str) -> String {
        match self.apply_patterns(input) {
            Ok(out) => out,
            Err(err) => {
                self.report(&err);
                // NOTE: unredacted fallback, this leaf is exposed while a rule is broken
                input.to_string()
            }
        }
    }

    /// Redact and render as JSON with object keys sorted at every level
    pub fn redact_to_string(&self, value: &FieldValue) -> String {
        let mut out = String::new();
        write_canonical(&self.redact(value), &mut out);
        out
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn apply_patterns(&self, input: &str) -> Result<String, RedactionError> {
        let mut out = input.to_string();
        for matcher in &self.matchers {
            let matcher = matcher.as_ref().map_err(Clone::clone)?;
            out = matcher.replace_all(&out);
        }
        Ok(out)
    }

    fn report(&self, err: &RedactionError) {
        if let Some(ref hook) = self.on_error {
            call_guarded("on_redaction_error", || hook(err));
        }
    }
}

impl fmt::Debug for Redactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redactor")
            .field("keys", &self.keys.len())
            .field("patterns", &self.matchers.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// One traversal; tracks the shared nodes on the current path
struct Walk<'a> {
    redactor: &'a Redactor,
    ancestors: Vec<usize>,
}

impl<'a> Walk<'a> {
    fn new(redactor: &'a Redactor) -> Self {
        Self {
            redactor,
            ancestors: Vec::new(),
        }
    }

    fn value(&mut self, value: &FieldValue, depth: usize) -> Value {
        if depth > self.redactor.max_depth {
            return Value::String(TRUNCATED.to_string());
        }

        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::String(s) => Value::String(self.redactor.redact_str(s)),
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.value(item, depth + 1))
                    .collect(),
            ),
            FieldValue::Map(ctx) => Value::Object(self.map(ctx, depth)),
            FieldValue::Shared(node) => {
                let addr = node.addr();
                if self.ancestors.contains(&addr) {
                    return Value::String(CIRCULAR.to_string());
                }
                self.ancestors.push(addr);
                // Shared nodes are transparent: they do not add a level.
                let out = node.with_value(|inner| self.value(inner, depth));
                self.ancestors.pop();
                out
            }
        }
    }

    fn map(&mut self, ctx: &LogContext, depth: usize) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in ctx.iter() {
            let redacted = if self.redactor.is_sensitive_key(key) {
                Value::String(REDACTED.to_string())
            } else {
                self.value(value, depth + 1)
            };
            out.insert(key.to_string(), redacted);
        }
        out
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}
