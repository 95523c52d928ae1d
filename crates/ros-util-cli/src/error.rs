//! Errors reported by the command line tool.

use thiserror::Error;

/// Errors that end a `rosutil` run.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `name=literal` argument without `=`.
    #[error("invalid parameter '{0}', expected name=literal")]
    InvalidParam(String),

    /// Input that is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a script or parameter file, or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Loading the session configuration.
    #[error(transparent)]
    Session(#[from] ros_util::SessionError),
}

/// Result type alias for command line operations.
pub type CliResult<T> = Result<T, CliError>;
