//! RouterOS scripting literal codec.
//!
//! This crate converts between Rust values and the literal syntax understood
//! by the RouterOS scripting language. It is used to render command arguments
//! and script parameters, and to interpret values read back from a device.
//!
//! # Literal Overview
//!
//! | Literal                     | Decoded as            |
//! |-----------------------------|-----------------------|
//! | `` (empty), `nil`           | [`Value::Null`]       |
//! | `true`, `false`, `yes`, `no`| [`Value::Bool`]       |
//! | `42`, `-7`, `1.5`           | [`Value::Integer`] / [`Value::Real`] |
//! | `1w2d3:04:05`, `4s500ms`    | [`Value::Duration`]   |
//! | `jan/02/2024 10:00:00`      | [`Value::Timestamp`]  |
//! | `"quoted\_text"`            | [`Value::Text`]       |
//! | `{a=1;b={2;3}}`, `({})`     | [`Value::List`]       |
//! | anything else               | [`Value::Text`] (bareword) |
//!
//! Decoding never fails: input that does not match a specific literal form
//! is returned as text, the same way the device treats an unquoted word.
//!
//! # Example
//!
//! ```rust
//! use ros_script::{decode, encode, Value};
//!
//! let value = decode("{name=\"ether1\";mtu=1500}");
//! assert_eq!(value.get("name").and_then(Value::as_str), Some("ether1"));
//! assert_eq!(encode(&value), "{\"name\"=\"ether1\";\"mtu\"=1500}");
//! ```

mod decode;
mod duration;
mod encode;
mod error;
mod escape;
mod value;

pub use decode::*;
pub use duration::*;
pub use encode::*;
pub use error::*;
pub use escape::*;
pub use value::*;
