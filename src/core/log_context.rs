//! Structured logging context for key-value fields
//!
//! This module provides:
//! - `FieldValue`: Tagged value tree carried by log contexts
//! - `SharedValue`: Aliased node that may be referenced from several places (or itself)
//! - `LogContext`: Insertion-ordered per-entry fields

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    Map(LogContext),
    /// Aliased node; the only way to build shared or cyclic graphs
    Shared(SharedValue),
}

impl FieldValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(v) => FieldValue::Int(v),
            Err(_) => FieldValue::Float(i as f64),
        }
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        FieldValue::from(i as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<LogContext> for FieldValue {
    fn from(ctx: LogContext) -> Self {
        FieldValue::Map(ctx)
    }
}

impl From<SharedValue> for FieldValue {
    fn from(shared: SharedValue) -> Self {
        FieldValue::Shared(shared)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                let mut ctx = LogContext::new();
                for (key, value) in map {
                    ctx.insert(key, FieldValue::from(value));
                }
                FieldValue::Map(ctx)
            }
        }
    }
}

/// Shared, mutable node inside a value graph
///
/// Identity is the allocation: two `SharedValue`s are equal only when they
/// point at the same node. Cloning shares the node.
///
/// # Example
///
/// ```
/// use rust_redacting_logger::{FieldValue, LogContext, SharedValue};
///
/// let node = SharedValue::new(FieldValue::Null);
/// node.set(LogContext::new().with_field("self", node.clone()).into());
/// assert!(node.ptr_eq(&node.clone()));
/// ```
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<FieldValue>>);

impl SharedValue {
    pub fn new(value: FieldValue) -> Self {
        SharedValue(Arc::new(RwLock::new(value)))
    }

    /// Replace the node's value in place
    pub fn set(&self, value: FieldValue) {
        *self.0.write() = value;
    }

    /// Run `f` against the current value under a read lock
    pub fn with_value<R>(&self, f: impl FnOnce(&FieldValue) -> R) -> R {
        f(&self.0.read())
    }

    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address used as the node identity during traversal
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.addr())
    }
}

/// Context for structured logging with key-value fields
///
/// Keys keep their first insertion position; re-inserting a key replaces
/// the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    fields: Vec<(String, FieldValue)>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to the context
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.insert(key, value);
        self
    }

    /// Add a field to the context (mutable version)
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay `other` onto this context; keys from `other` win
    pub fn merge(&mut self, other: &LogContext) {
        for (key, value) in &other.fields {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Non-mutating form of [`merge`](Self::merge)
    #[must_use]
    pub fn merged(&self, other: &LogContext) -> LogContext {
        let mut out = self.clone();
        out.merge(other);
        out
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = LogContext::new();
        for (key, value) in iter {
            ctx.insert(key, value);
        }
        ctx
    }
}
