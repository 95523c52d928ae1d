//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Default settle delay for file operations (milliseconds).
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// Default read size for streamed script parameters (bytes).
pub const DEFAULT_CHUNK_SIZE: usize = 0xFFFF;

/// Default size up to which an assembled script is kept in memory (bytes).
pub const DEFAULT_SPOOL_LIMIT: usize = 1 << 20;

/// Tunables for a [`Util`](crate::Util) session.
///
/// Loadable from YAML; missing fields take their defaults:
///
/// ```yaml
/// settle_delay_ms: 2000
/// chunk_size: 65535
/// spool_limit: 1048576
/// script_name_prefix: backup-job
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wait after creating, writing or removing a file before checking on it.
    /// The device's file system gives no completion signal.
    pub settle_delay_ms: u64,
    /// Maximum bytes read at a time from a streamed script parameter.
    pub chunk_size: usize,
    /// Size at which an assembled script moves from memory to a temporary
    /// file while it is uploaded.
    pub spool_limit: usize,
    /// Prefix for generated script names. Defaults to the local host name.
    pub script_name_prefix: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            spool_limit: DEFAULT_SPOOL_LIMIT,
            script_name_prefix: None,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> SessionResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        SessionConfig::from_yaml_str(&text)
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_delay_ms)
    }

    /// Chunk size, never zero.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
