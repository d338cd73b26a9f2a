//! Cache events and the sinks that receive them.
//!
//! Refresh failures are swallowed with respect to callers, so they have to
//! land somewhere an operator (or a test) can see them.

use std::sync::Arc;

use parking_lot::Mutex;

use super::key::fingerprint;
use crate::Error;

/// Something the cache did or observed.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// Served a fresh value.
    Hit { cache: String, key: String },
    /// Served a stale value (a refresh is running or was just started).
    StaleHit { cache: String, key: String },
    /// No value stored; the caller waits on a fetch.
    Miss { cache: String, key: String },
    /// A background refresh was started for a stale entry.
    RefreshStarted { cache: String, key: String },
    /// A fetch succeeded and its value was stored.
    Stored { cache: String, key: String, refresh: bool },
    /// A refresh failed; the previous value was kept (or dropped, if configured).
    RefreshFailed { cache: String, key: String, error: Arc<Error>, kept_stale: bool },
    /// A fetch for a missing key failed; nothing was stored.
    FetchFailed { cache: String, key: String, error: Arc<Error> },
    /// An in-flight fetch was aborted or panicked.
    Aborted { cache: String, key: String },
    /// An entry was evicted to make room.
    Evicted { cache: String, key: String },
}

impl CacheEvent {
    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit { key, .. }
            | CacheEvent::StaleHit { key, .. }
            | CacheEvent::Miss { key, .. }
            | CacheEvent::RefreshStarted { key, .. }
            | CacheEvent::Stored { key, .. }
            | CacheEvent::RefreshFailed { key, .. }
            | CacheEvent::FetchFailed { key, .. }
            | CacheEvent::Aborted { key, .. }
            | CacheEvent::Evicted { key, .. } => key,
        }
    }
}

/// Receives cache events. Called outside the cache's lock.
pub trait CacheObserver: Send + Sync {
    fn observe(&self, event: CacheEvent);
}

/// Logs cache events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn observe(&self, event: CacheEvent) {
        match event {
            CacheEvent::Hit { cache, key } => {
                tracing::trace!(cache = %cache, key = %fingerprint(&key), "cache hit");
            }
            CacheEvent::StaleHit { cache, key } => {
                tracing::debug!(cache = %cache, key = %fingerprint(&key), "serving stale value");
            }
            CacheEvent::Miss { cache, key } => {
                tracing::debug!(cache = %cache, key = %fingerprint(&key), "cache miss");
            }
            CacheEvent::RefreshStarted { cache, key } => {
                tracing::debug!(cache = %cache, key = %fingerprint(&key), "background refresh started");
            }
            CacheEvent::Stored { cache, key, refresh } => {
                tracing::debug!(cache = %cache, key = %fingerprint(&key), refresh, "value stored");
            }
            CacheEvent::RefreshFailed { cache, key, error, kept_stale } => {
                tracing::warn!(
                    cache = %cache,
                    key = %fingerprint(&key),
                    kept_stale,
                    error = %error,
                    "refresh failed, serving stale value"
                );
            }
            CacheEvent::FetchFailed { cache, key, error } => {
                tracing::error!(cache = %cache, key = %fingerprint(&key), error = %error, "fetch failed");
            }
            CacheEvent::Aborted { cache, key } => {
                tracing::warn!(cache = %cache, key = %fingerprint(&key), "fetch aborted");
            }
            CacheEvent::Evicted { cache, key } => {
                tracing::debug!(cache = %cache, key = %fingerprint(&key), "evicted");
            }
        }
    }
}

/// Keeps every event in memory. Useful for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CacheEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&CacheEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl CacheObserver for RecordingObserver {
    fn observe(&self, event: CacheEvent) {
        self.events.lock().push(event);
    }
}
