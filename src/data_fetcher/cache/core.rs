//! Keyed TTL store with in-flight request deduplication.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::AppError;

use super::clock::{Clock, SystemClock};
use super::types::{CacheEntry, CacheInfo, CacheStats, FetchOptions};

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, AppError>>>;

struct InFlight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

struct StoreState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    in_flight: HashMap<String, InFlight<V>>,
    stats: CacheStats,
}

impl<V> StoreState<V> {
    /// Drops the in-flight token for `key` if it is still the one identified by `id`.
    fn release(&mut self, key: &str, id: u64) {
        if self.in_flight.get(key).is_some_and(|f| f.id == id) {
            self.in_flight.remove(key);
        }
    }
}

/// Time-bounded memoization of read results.
///
/// Concurrent misses for the same key share one underlying fetch: the first
/// caller spawns it, later callers attach to it, and everyone receives the
/// same value or the same error. The fetch runs as its own tokio task, so a
/// caller that stops waiting never cancels it for the others, and a finished
/// fetch always lands in the cache.
///
/// Failures are never cached. Entries are not evicted by size; an entry
/// older than its TTL is ignored on read and replaced by the next
/// successful fetch.
pub struct TtlStore<V> {
    name: &'static str,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<StoreState<V>>>,
    next_id: AtomicU64,
}

impl<V> std::fmt::Debug for TtlStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlStore")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl<V> TtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a store backed by the system clock.
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self::with_clock(name, default_ttl, Arc::new(SystemClock))
    }

    /// Creates a store with an injected clock.
    pub fn with_clock(name: &'static str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            default_ttl,
            clock,
            state: Arc::new(Mutex::new(StoreState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                stats: CacheStats::default(),
            })),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the cached value for `key`, fetching it when needed.
    ///
    /// - a fresh entry is returned without touching `fetcher`
    /// - otherwise a running fetch for `key` is shared
    /// - otherwise `fetcher` is spawned and its outcome is handed to every waiter
    ///
    /// `options.force` skips the entry check but still shares a running fetch.
    #[instrument(skip_all, fields(store = self.name, key = %key, force = options.force))]
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: FetchOptions,
    ) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>> + Send + 'static,
    {
        let ttl = options.ttl.unwrap_or(self.default_ttl);

        let fetch = {
            let mut state = self.state.lock().await;

            if !options.force
                && let Some(entry) = state.entries.get(key)
            {
                let now = self.clock.now();
                if entry.is_fresh(now, ttl) {
                    let data = entry.data.clone();
                    debug!("Cache hit: age={:?}, ttl={:?}", entry.age(now), ttl);
                    state.stats.hits += 1;
                    return Ok(data);
                }
                debug!("Cache entry stale: age={:?}, ttl={:?}", entry.age(now), ttl);
            }

            state.stats.misses += 1;

            if let Some(running) = state.in_flight.get(key) {
                debug!("Joining in-flight fetch");
                let fetch = running.fetch.clone();
                state.stats.joins += 1;
                fetch
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let fetch = self.spawn_fetch(key.to_string(), id, fetcher());
                state.in_flight.insert(
                    key.to_string(),
                    InFlight {
                        id,
                        fetch: fetch.clone(),
                    },
                );
                state.stats.fetches += 1;
                info!("Started fetch for cache miss");
                fetch
            }
        };

        fetch.await
    }

    /// Spawns the fetch task and wraps its handle in a shareable future.
    ///
    /// Must be called with the state lock held so the task cannot complete
    /// before its token is registered.
    fn spawn_fetch<Fut>(&self, key: String, id: u64, fut: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V, AppError>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let name = self.name;
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = fut.await;
            let mut state = state.lock().await;
            state.release(&task_key, id);
            match &result {
                Ok(data) => {
                    state
                        .entries
                        .insert(task_key.clone(), CacheEntry::new(data.clone(), clock.now()));
                    debug!("Cached fresh value: store={name}, key={task_key}");
                }
                Err(e) => {
                    state.stats.failures += 1;
                    warn!("Fetch failed, nothing cached: store={name}, key={task_key}, error={e}");
                }
            }
            result
        });

        let state = Arc::clone(&self.state);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    let mut state = state.lock().await;
                    state.release(&key, id);
                    state.stats.failures += 1;
                    Err(AppError::task_failed(format!(
                        "fetch for {key} did not complete: {join_error}"
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Returns a fresh cached value without fetching.
    pub async fn peek(&self, key: &str) -> Option<V> {
        let state = self.state.lock().await;
        let entry = state.entries.get(key)?;
        entry
            .is_fresh(self.clock.now(), self.default_ttl)
            .then(|| entry.data.clone())
    }

    /// Removes the entry for `key`. A running fetch is left alone.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.state.lock().await.entries.remove(key).is_some()
    }

    /// Drops every entry and resets the counters. Running fetches are left
    /// alone and will repopulate their keys when they finish.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.stats = CacheStats::default();
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of fetches currently running.
    pub async fn in_flight(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }

    /// Size and counter snapshot for monitoring output.
    pub async fn info(&self) -> CacheInfo {
        let state = self.state.lock().await;
        CacheInfo {
            entries: state.entries.len(),
            in_flight: state.in_flight.len(),
            stats: state.stats,
        }
    }
}
