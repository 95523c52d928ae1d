//! Names for transient scripts.

use rand::Rng;

/// Source of names for scripts uploaded by [`Util::exec`](crate::Util::exec).
///
/// Names must not collide with scripts already on the device. Closures
/// returning a `String` implement this trait, which is convenient for
/// deterministic names in tests.
pub trait ScriptNameGenerator {
    /// Produce the next name.
    fn next_name(&mut self) -> String;
}

impl<F: FnMut() -> String> ScriptNameGenerator for F {
    fn next_name(&mut self) -> String {
        self()
    }
}

/// Host-prefixed names with a time-derived and a random component,
/// e.g. `router-admin65f1c0a3b2e41.48213907`.
#[derive(Debug, Clone)]
pub struct HostScriptNames {
    prefix: String,
}

impl HostScriptNames {
    /// Use the given prefix, or the local host name when `None`.
    pub fn new(prefix: Option<String>) -> Self {
        HostScriptNames {
            prefix: prefix.unwrap_or_else(local_host_name),
        }
    }

    /// Get the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for HostScriptNames {
    fn default() -> Self {
        HostScriptNames::new(None)
    }
}

impl ScriptNameGenerator for HostScriptNames {
    fn next_name(&mut self) -> String {
        let micros = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let suffix: u32 = rand::thread_rng().gen_range(0..100_000_000);
        format!("{}{:013x}.{:08}", self.prefix, micros, suffix)
    }
}

fn local_host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
