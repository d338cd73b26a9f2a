//! In-memory, stale-tolerant fetch cache.
//!
//! Sits between callers and a slow, rate-limited upstream. It supports:
//!
//! - Fetch-on-miss through a caller-supplied [`Fetcher`]
//! - Single-flight: at most one upstream call per key at a time
//! - Time-based freshness with stale-while-revalidate refreshes
//! - Serving the last good value when a refresh fails or is aborted
//! - Bounded size with least-recently-accessed eviction
//!
//! Values are stored behind `Arc` and never mutated once stored.

pub mod engine;
pub mod key;
pub mod lru;
pub mod observe;
pub mod options;

pub use crate::Error;

pub use engine::{CacheBuilder, EntryState, Fetcher, StaleCache};
pub use key::CacheKey;
pub use observe::{CacheEvent, CacheObserver, RecordingObserver, TracingObserver};
pub use options::CacheOptions;
