//! Cache construction options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for a [`StaleCache`](super::StaleCache).
///
/// The defaults favour availability over freshness: stale values are served
/// whenever something goes wrong with a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Maximum resident entries.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Freshness window in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Return the stale value immediately while a refresh runs in the background.
    #[serde(default = "default_true")]
    pub allow_stale: bool,

    /// Fall back to the stale value when a refresh fails.
    #[serde(default = "default_true")]
    pub allow_stale_on_fetch_rejection: bool,

    /// Fall back to the stale value when a refresh is aborted.
    #[serde(default = "default_true")]
    pub allow_stale_on_fetch_abort: bool,

    /// Keep the previous value when a refresh fails.
    #[serde(default = "default_true")]
    pub no_delete_on_fetch_rejection: bool,
}

fn default_capacity() -> usize {
    1000
}

fn default_ttl_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_ms: default_ttl_ms(),
            allow_stale: true,
            allow_stale_on_fetch_rejection: true,
            allow_stale_on_fetch_abort: true,
            no_delete_on_fetch_rejection: true,
        }
    }
}

impl CacheOptions {
    /// Freshness window as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Options with the given capacity, everything else default.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, ..Default::default() }
    }
}
