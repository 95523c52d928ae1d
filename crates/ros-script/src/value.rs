//! The decoded form of a scripting literal.
//!
//! This module provides:
//! - [`Value`] - The tagged union every literal decodes to
//! - [`Entry`] - One member of a [`Value::List`], optionally keyed
//! - `From` conversions from common Rust types, and `TryFrom` back out

use std::fmt;

use chrono::{DateTime, Utc};

use crate::duration::Duration;
use crate::encode::encode;
use crate::error::{ScriptError, ScriptResult};

// ============================================================================
// Value Enum
// ============================================================================

/// A RouterOS scripting value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `nil` or the empty literal.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Integer(i64),
    /// Floating point value, also used for integers too wide for `i64`.
    Real(f64),
    /// Signed elapsed time (the device's `time` type).
    Duration(Duration),
    /// Calendar date with time of day, in UTC.
    Timestamp(DateTime<Utc>),
    /// Unescaped byte string.
    Text(Vec<u8>),
    /// Ordered array; entries may be positional or keyed.
    List(Vec<Entry>),
}

/// A member of a [`Value::List`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Key for associative members, `None` for positional ones.
    pub key: Option<Value>,
    /// The member's value.
    pub value: Value,
}

impl Entry {
    /// Create a positional entry.
    pub fn positional(value: impl Into<Value>) -> Self {
        Entry {
            key: None,
            value: value.into(),
        }
    }

    /// Create a keyed entry.
    pub fn keyed(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Entry {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

impl Value {
    /// Create a text value.
    pub fn text(text: impl AsRef<[u8]>) -> Self {
        Value::Text(text.as_ref().to_vec())
    }

    /// Create a list of positional entries.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(values.into_iter().map(Entry::positional).collect())
    }

    /// Create a list of keyed entries, preserving iteration order.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::List(
            pairs
                .into_iter()
                .map(|(k, v)| Entry::keyed(k, v))
                .collect(),
        )
    }

    /// Name of the variant, as the device would report it with `:typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "num",
            Value::Real(_) => "real",
            Value::Duration(_) => "time",
            Value::Timestamp(_) => "date",
            Value::Text(_) => "str",
            Value::List(_) => "array",
        }
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to bool if possible.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to i64 if possible.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to f64 if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Raw bytes of a text value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Text value as `&str`, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Convert to duration if possible.
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Value::Duration(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to timestamp if possible.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    /// List entries, if this is a list.
    pub fn as_list(&self) -> Option<&[Entry]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a keyed list member by its text key.
    ///
    /// When several members share the key, the last one wins, matching how
    /// the device assigns repeated keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_list()?
            .iter()
            .rev()
            .find(|e| matches!(&e.key, Some(Value::Text(k)) if k.as_slice() == key.as_bytes()))
            .map(|e| &e.value)
    }

    /// Look up a positional list member by its index among positional members.
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_list()?
            .iter()
            .filter(|e| e.key.is_none())
            .nth(index)
            .map(|e| &e.value)
    }
}

impl fmt::Display for Value {
    /// Formats the value as a scripting literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

// ============================================================================
// From implementations for Value
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        // Widths beyond i64 degrade to a real, like the device's own numbers.
        i64::try_from(v)
            .map(Value::Integer)
            .unwrap_or(Value::Real(v as f64))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v.into_bytes())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::from(v.as_str())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Text(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Text(v.to_vec())
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<std::time::Duration> for Value {
    fn from(v: std::time::Duration) -> Self {
        Value::Duration(Duration::from_std(v))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::list(v)
    }
}

impl From<Vec<Entry>> for Value {
    fn from(v: Vec<Entry>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// TryFrom implementations out of Value
// ============================================================================

fn mismatch(expected: &'static str, found: &Value) -> ScriptError {
    ScriptError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl TryFrom<&Value> for bool {
    type Error = ScriptError;

    fn try_from(value: &Value) -> ScriptResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl TryFrom<&Value> for i64 {
    type Error = ScriptError;

    fn try_from(value: &Value) -> ScriptResult<Self> {
        value.as_i64().ok_or_else(|| mismatch("num", value))
    }
}

impl TryFrom<&Value> for f64 {
    type Error = ScriptError;

    fn try_from(value: &Value) -> ScriptResult<Self> {
        value.as_f64().ok_or_else(|| mismatch("real", value))
    }
}

impl TryFrom<&Value> for String {
    type Error = ScriptError;

    fn try_from(value: &Value) -> ScriptResult<Self> {
        let bytes = value.as_bytes().ok_or_else(|| mismatch("str", value))?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ScriptError::InvalidUtf8)
    }
}

impl TryFrom<&Value> for std::time::Duration {
    type Error = ScriptError;

    fn try_from(value: &Value) -> ScriptResult<Self> {
        value
            .as_duration()
            .ok_or_else(|| mismatch("time", value))?
            .to_std()
    }
}
