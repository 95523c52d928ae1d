//! JSON views of script values.
//!
//! Lists whose entries all lack keys become arrays; any other list becomes
//! an object keyed by the entry keys (non-text keys are written as
//! literals). Durations are written as literals, timestamps as RFC 3339.

use ros_script::{encode, Entry, Value};
use serde_json::{Map, Number, Value as Json};

/// Convert a decoded value to JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::Real(r) => Number::from_f64(*r).map_or_else(|| Json::String(r.to_string()), Json::Number),
        Value::Duration(_) => Json::String(encode(value)),
        Value::Timestamp(t) => Json::String(t.to_rfc3339()),
        Value::Text(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        Value::List(entries) if entries.iter().all(|e| e.key.is_none()) => {
            Json::Array(entries.iter().map(|e| to_json(&e.value)).collect())
        }
        Value::List(entries) => {
            let mut object = Map::new();
            for (i, entry) in entries.iter().enumerate() {
                let key = match &entry.key {
                    Some(Value::Text(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
                    Some(other) => encode(other),
                    None => i.to_string(),
                };
                object.insert(key, to_json(&entry.value));
            }
            Json::Object(object)
        }
    }
}

/// Convert JSON to a value for encoding.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::text(s),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| Entry::positional(from_json(item)))
                .collect(),
        ),
        Json::Object(object) => Value::List(
            object
                .iter()
                .map(|(k, v)| Entry::keyed(k.as_str(), from_json(v)))
                .collect(),
        ),
    }
}
