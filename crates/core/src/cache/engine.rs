//! The stale-tolerant fetch cache.
//!
//! ### Lookup
//! - Fresh entry: returned immediately.
//! - Stale entry: returned immediately while one background refresh runs.
//! - No entry: every caller waits on the same upstream fetch.
//!
//! ### Concurrency
//! Bookkeeping (lookup, LRU touch, registering a flight, storing a result)
//! happens under a synchronous lock that is never held across an `.await`.
//! Checking for an in-flight fetch and registering a new one happen in the
//! same critical section, which is what makes the cache single-flight.
//!
//! Fetches run in spawned tasks. A task stores its own result before
//! publishing it, so a background refresh completes even when nobody awaits
//! it, and every waiter of a flight sees exactly that flight's outcome.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::time::Instant;

use super::lru::LruStore;
use super::observe::{CacheEvent, CacheObserver, TracingObserver};
use super::options::CacheOptions;
use crate::Error;

/// The expensive upstream operation behind a cache.
///
/// Receives the cache key and produces the value for it. Any closure
/// `Fn(String) -> impl Future<Output = Result<V, Error>>` is a fetcher.
#[async_trait]
pub trait Fetcher<V>: Send + Sync + 'static {
    async fn fetch(&self, key: &str) -> Result<V, Error>;
}

#[async_trait]
impl<V, F, Fut> Fetcher<V> for F
where
    V: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, Error>> + Send + 'static,
{
    async fn fetch(&self, key: &str) -> Result<V, Error> {
        (self)(key.to_string()).await
    }
}

/// Where an entry stands right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Absent,
    Fresh,
    Stale,
    /// Stale, with a refresh in flight.
    PendingRefresh,
}

#[derive(Debug, Clone)]
enum FlightError {
    Rejected(Arc<Error>),
    Aborted,
}

type Outcome<V> = Result<Arc<V>, FlightError>;
type SharedOutcome<V> = Shared<BoxFuture<'static, Outcome<V>>>;

struct Flight<V> {
    id: u64,
    outcome: SharedOutcome<V>,
    abort: AbortHandle,
}

struct State<V> {
    store: LruStore<V>,
    in_flight: HashMap<String, Flight<V>>,
    next_flight: u64,
}

struct Inner<V> {
    name: String,
    options: CacheOptions,
    fetcher: Box<dyn Fetcher<V>>,
    observer: Arc<dyn CacheObserver>,
    state: Mutex<State<V>>,
}

/// Key→value cache with fetch-on-miss, single-flight and stale serving.
///
/// Cloning is cheap and clones share the same store.
pub struct StaleCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for StaleCache<V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<V> std::fmt::Debug for StaleCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaleCache")
            .field("name", &self.inner.name)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`StaleCache`].
pub struct CacheBuilder<V> {
    name: String,
    options: CacheOptions,
    fetcher: Box<dyn Fetcher<V>>,
    observer: Arc<dyn CacheObserver>,
}

impl<V: Send + Sync + 'static> CacheBuilder<V> {
    pub fn options(mut self, options: CacheOptions) -> Self {
        self.options = options;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> StaleCache<V> {
        let state = State { store: LruStore::new(self.options.capacity), in_flight: HashMap::new(), next_flight: 0 };
        StaleCache {
            inner: Arc::new(Inner {
                name: self.name,
                options: self.options,
                fetcher: self.fetcher,
                observer: self.observer,
                state: Mutex::new(state),
            }),
        }
    }
}

impl<V: Send + Sync + 'static> StaleCache<V> {
    /// Start building a cache named `name` (used in logs and events).
    pub fn builder(name: impl Into<String>, fetcher: impl Fetcher<V>) -> CacheBuilder<V> {
        CacheBuilder {
            name: name.into(),
            options: CacheOptions::default(),
            fetcher: Box::new(fetcher),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Cache with the given options that logs through `tracing`.
    pub fn new(name: impl Into<String>, options: CacheOptions, fetcher: impl Fetcher<V>) -> Self {
        Self::builder(name, fetcher).options(options).build()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    /// Get the value for `key`, fetching it if needed.
    ///
    /// # Errors
    ///
    /// Fails only when there is no value to serve: the key was never stored
    /// (or was evicted) and the fetch failed or was aborted.
    pub async fn get(&self, key: &str) -> Result<Arc<V>, Error> {
        let inner = &self.inner;
        let now = Instant::now();

        let (stale, flight) = {
            let mut state = inner.state.lock();
            match state.store.touch(key).map(|e| (Arc::clone(&e.value), e.stored_at)) {
                Some((value, stored_at)) if now.saturating_duration_since(stored_at) < inner.options.ttl() => {
                    drop(state);
                    inner.emit(CacheEvent::Hit { cache: inner.name.clone(), key: key.to_string() });
                    return Ok(value);
                }
                Some((value, _)) => {
                    let (flight, started) = inner.flight_for(&mut state, key);
                    drop(state);
                    if started {
                        inner.emit(CacheEvent::RefreshStarted { cache: inner.name.clone(), key: key.to_string() });
                    }
                    inner.emit(CacheEvent::StaleHit { cache: inner.name.clone(), key: key.to_string() });
                    if inner.options.allow_stale {
                        return Ok(value);
                    }
                    (Some(value), flight)
                }
                None => {
                    let (flight, _) = inner.flight_for(&mut state, key);
                    drop(state);
                    inner.emit(CacheEvent::Miss { cache: inner.name.clone(), key: key.to_string() });
                    (None, flight)
                }
            }
        };

        match flight.await {
            Ok(value) => Ok(value),
            Err(FlightError::Rejected(source)) => match stale {
                Some(value) if inner.options.allow_stale_on_fetch_rejection => Ok(value),
                _ => Err(Error::FetchFailed { cache: inner.name.clone(), key: key.to_string(), source }),
            },
            Err(FlightError::Aborted) => match stale {
                Some(value) if inner.options.allow_stale_on_fetch_abort => Ok(value),
                _ => Err(Error::FetchAborted { cache: inner.name.clone(), key: key.to_string() }),
            },
        }
    }

    /// The stored value, without fetching or touching the LRU order.
    pub fn peek(&self, key: &str) -> Option<Arc<V>> {
        self.inner.state.lock().store.peek(key).map(|e| Arc::clone(&e.value))
    }

    pub fn state(&self, key: &str) -> EntryState {
        let state = self.inner.state.lock();
        let Some(entry) = state.store.peek(key) else {
            return EntryState::Absent;
        };
        if Instant::now().saturating_duration_since(entry.stored_at) < self.inner.options.ttl() {
            EntryState::Fresh
        } else if state.in_flight.contains_key(key) {
            EntryState::PendingRefresh
        } else {
            EntryState::Stale
        }
    }

    /// Abort the in-flight fetch for `key`, if there is one.
    ///
    /// Waiters get the stale value when one exists and the options allow it,
    /// otherwise `Error::FetchAborted`.
    pub fn abort(&self, key: &str) -> bool {
        match self.inner.state.lock().in_flight.get(key) {
            Some(flight) => {
                flight.abort.abort();
                true
            }
            None => false,
        }
    }

    /// Number of fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.state.lock().in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.state.lock().store.capacity()
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.state.lock().store.keys_by_recency()
    }

    /// Drop every stored entry. In-flight fetches still store their results.
    pub fn clear(&self) {
        self.inner.state.lock().store.clear();
    }
}

impl<V: Send + Sync + 'static> Inner<V> {
    /// Join the running flight for `key`, or start one.
    ///
    /// Must be called with the state lock held; returns whether a new flight
    /// was started.
    fn flight_for(self: &Arc<Self>, state: &mut State<V>, key: &str) -> (SharedOutcome<V>, bool) {
        if let Some(flight) = state.in_flight.get(key) {
            return (flight.outcome.clone(), false);
        }

        state.next_flight += 1;
        let id = state.next_flight;
        let (abort, registration) = AbortHandle::new_pair();

        let inner = Arc::clone(self);
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let fetch = AssertUnwindSafe(inner.fetcher.fetch(&owned_key)).catch_unwind();
            let outcome = match Abortable::new(fetch, registration).await {
                Ok(Ok(Ok(value))) => Ok(Arc::new(value)),
                Ok(Ok(Err(error))) => Err(FlightError::Rejected(Arc::new(error))),
                Ok(Err(_)) | Err(_) => Err(FlightError::Aborted),
            };
            inner.settle(&owned_key, id, &outcome);
            outcome
        });

        let outcome: SharedOutcome<V> = task
            .map(|joined| joined.unwrap_or(Err(FlightError::Aborted)))
            .boxed()
            .shared();
        state.in_flight.insert(key.to_string(), Flight { id, outcome: outcome.clone(), abort });
        (outcome, true)
    }

    /// Apply a finished flight to the store and report it.
    fn settle(&self, key: &str, id: u64, outcome: &Outcome<V>) {
        let mut state = self.state.lock();
        if state.in_flight.get(key).is_some_and(|f| f.id == id) {
            state.in_flight.remove(key);
        }
        let refresh = state.store.contains(key);

        let events = match outcome {
            Ok(value) => {
                let evicted = state.store.insert(key, Arc::clone(value), Instant::now());
                let mut events = Vec::with_capacity(2);
                if let Some(evicted) = evicted {
                    events.push(CacheEvent::Evicted { cache: self.name.clone(), key: evicted });
                }
                events.push(CacheEvent::Stored { cache: self.name.clone(), key: key.to_string(), refresh });
                events
            }
            Err(FlightError::Rejected(error)) if refresh => {
                let kept_stale = self.options.no_delete_on_fetch_rejection;
                if !kept_stale {
                    state.store.remove(key);
                }
                vec![CacheEvent::RefreshFailed {
                    cache: self.name.clone(),
                    key: key.to_string(),
                    error: Arc::clone(error),
                    kept_stale,
                }]
            }
            Err(FlightError::Rejected(error)) => vec![CacheEvent::FetchFailed {
                cache: self.name.clone(),
                key: key.to_string(),
                error: Arc::clone(error),
            }],
            Err(FlightError::Aborted) => vec![CacheEvent::Aborted { cache: self.name.clone(), key: key.to_string() }],
        };
        drop(state);

        for event in events {
            self.emit(event);
        }
    }

    fn emit(&self, event: CacheEvent) {
        self.observer.observe(event);
    }
}
