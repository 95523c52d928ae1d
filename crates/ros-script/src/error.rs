//! Error types for the literal codec.

use thiserror::Error;

/// Errors raised by typed conversions out of a [`Value`](crate::Value).
///
/// Decoding and encoding themselves are infallible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The value holds a different variant than the one requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Requested type.
        expected: &'static str,
        /// Type actually held.
        found: &'static str,
    },

    /// Text is not valid UTF-8.
    #[error("text is not valid UTF-8")]
    InvalidUtf8,

    /// Duration does not fit the target representation.
    #[error("duration out of range: {0}")]
    DurationOutOfRange(String),
}

/// Result type alias for codec conversions.
pub type ScriptResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScriptError::TypeMismatch {
            expected: "integer",
            found: "text",
        };
        assert_eq!(err.to_string(), "type mismatch: expected integer, found text");
    }
}
