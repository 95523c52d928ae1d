//! Literal encoding.
//!
//! [`encode`] is the inverse of [`decode`](crate::decode): decoding an
//! encoded value yields an equal value. Text is always quoted and fully
//! escaped, so encoded values can be inserted into a script or command
//! without changing its structure.

use std::fmt::Display;

use chrono::{DateTime, Timelike, Utc};

use crate::decode::EMPTY_LIST_LITERAL;
use crate::duration::Duration;
use crate::escape::escape_text;
use crate::value::{Entry, Value};

/// Encode a value as a scripting literal.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) if f.is_finite() => format!("{:?}", f),
        Value::Real(f) => encode_opaque(f),
        Value::Duration(d) => encode_duration(d),
        Value::Timestamp(ts) => encode_timestamp(ts),
        Value::Text(bytes) => quote(bytes),
        Value::List(entries) if entries.is_empty() => EMPTY_LIST_LITERAL.to_string(),
        Value::List(entries) => {
            // A lone positional nil would otherwise read back as `{}`.
            if let [Entry { key: None, value: Value::Null }] = entries.as_slice() {
                return "{nil}".to_string();
            }
            let members: Vec<String> = entries
                .iter()
                .map(|entry| match &entry.key {
                    Some(key) => format!("{}={}", encode(key), encode(&entry.value)),
                    None => encode(&entry.value),
                })
                .collect();
            format!("{{{}}}", members.join(";"))
        }
    }
}

/// Encode anything displayable as a quoted string literal.
///
/// Used for values with no literal form of their own.
pub fn encode_opaque(value: &impl Display) -> String {
    quote(value.to_string())
}

fn quote(bytes: impl AsRef<[u8]>) -> String {
    format!("\"{}\"", escape_text(bytes))
}

/// Sub-second precision is not written out.
fn encode_duration(d: &Duration) -> String {
    let sign = if d.is_negative() { "-" } else { "" };
    let days = match d.total_days() {
        // Absolute day form: the measured day count.
        Some(total) => total,
        // Relative day form: the day component as written.
        None => d.days(),
    };
    format!(
        "{}{}d{:02}:{:02}:{:02}",
        sign,
        days,
        d.hours(),
        d.minutes(),
        d.seconds()
    )
}

/// Midnight is written as a bare date. A fraction is written with six
/// digits, or nine when the timestamp is not a whole microsecond.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    let nanos = ts.timestamp_subsec_nanos();
    if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 && nanos == 0 {
        return ts.format("%b/%d/%Y").to_string();
    }
    let mut out = ts.format("%b/%d/%Y %H:%M:%S").to_string();
    if nanos % 1_000 != 0 {
        out.push_str(&format!(".{:09}", nanos));
    } else if nanos != 0 {
        out.push_str(&format!(".{:06}", nanos / 1_000));
    }
    out
}
