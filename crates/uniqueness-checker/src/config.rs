//! Configuration for the Uniqueness Checker

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Checker configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquenessConfig {
    /// Maximum requests accepted in one batch at the IPC boundary
    pub max_batch_size: usize,
    /// How long a session waits for a row lock before giving up
    pub lock_timeout_ms: u64,
    /// Store final rejections so duplicates replay them
    pub persist_rejections: bool,
}

impl Default for UniquenessConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            lock_timeout_ms: 5000,
            persist_rejections: true,
        }
    }
}

impl UniquenessConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `UC_MAX_BATCH_SIZE`: Maximum batch size (default: 1000)
    /// - `UC_LOCK_TIMEOUT_MS`: Row lock timeout in milliseconds (default: 5000)
    /// - `UC_PERSIST_REJECTIONS`: Store final rejections (default: true)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            max_batch_size: lookup("UC_MAX_BATCH_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_batch_size),

            lock_timeout_ms: lookup("UC_LOCK_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lock_timeout_ms),

            persist_rejections: lookup("UC_PERSIST_REJECTIONS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.persist_rejections),
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
