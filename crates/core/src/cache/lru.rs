//! Bounded store ordered by last access.
//!
//! A thin layer over [`lru::LruCache`] that keeps the fetch time next to each
//! value. All operations are synchronous and expected to run under the
//! cache's lock.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::time::Instant;

/// A stored value and the moment it was fetched.
#[derive(Debug)]
pub struct Entry<V> {
    pub value: Arc<V>,
    pub stored_at: Instant,
}

/// Capacity-bounded map with least-recently-accessed eviction.
#[derive(Debug)]
pub struct LruStore<V> {
    entries: LruCache<String, Entry<V>>,
}

impl<V> LruStore<V> {
    /// Create an empty store. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self { entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)) }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Look up without changing the access order.
    pub fn peek(&self, key: &str) -> Option<&Entry<V>> {
        self.entries.peek(key)
    }

    /// Look up and mark as most recently used.
    pub fn touch(&mut self, key: &str) -> Option<&Entry<V>> {
        self.entries.get(key)
    }

    /// Store a value.
    ///
    /// Replacing an existing key keeps its access position and never evicts.
    /// A new key is inserted as most recently used; if the store is full the
    /// least recently used entry is evicted first and its key returned.
    pub fn insert(&mut self, key: &str, value: Arc<V>, stored_at: Instant) -> Option<String> {
        if let Some(entry) = self.entries.peek_mut(key) {
            entry.value = value;
            entry.stored_at = stored_at;
            return None;
        }

        // only a new key reaches push, so a returned pair is always an eviction
        self.entries.push(key.to_string(), Entry { value, stored_at }).map(|(evicted, _)| evicted)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        self.entries.pop(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.entries.iter().rev().map(|(key, _)| key.clone()).collect()
    }
}
