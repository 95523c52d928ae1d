//! Error types for the session layer.
//!
//! Failures reported by the device are not errors here: they come back as
//! error entries in a [`ResponseCollection`](crate::ResponseCollection), or
//! as `false`/`None`/`-1` from verification-style operations. Only transport
//! failures and local misuse are raised.

use thiserror::Error;

/// Errors that can occur when working with a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying connection failed to deliver a request.
    #[error("transport error: {0}")]
    Transport(String),

    /// A command tried to leave the current menu.
    #[error("command '{0}' tried to go to a different menu")]
    MenuMismatch(String),

    /// An argument that would make a synchronous request never finish.
    #[error("argument '{0}' is prohibited here")]
    ProhibitedArgument(String),

    /// Reading a streamed parameter or file body failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl SessionError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        SessionError::Transport(message.into())
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
