//! Cache data structures with TTL support

use std::fmt;
use std::time::{Duration, Instant};

/// A cached payload and the instant it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub cached_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(data: V, cached_at: Instant) -> Self {
        Self { data, cached_at }
    }

    /// Age of the entry relative to `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.cached_at)
    }

    /// An entry is fresh while its age is at most `ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) <= ttl
    }
}

/// Per-call options for [`TtlStore::get_or_fetch`](super::TtlStore::get_or_fetch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the cache read. An already running fetch for the key is still shared.
    pub force: bool,
    /// Override the store's default TTL for this read.
    pub ttl: Option<Duration>,
}

impl FetchOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ttl: None,
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            force: false,
            ttl: Some(ttl),
        }
    }
}

/// Composite cache keys for the secondary lookups: entity type plus natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MatchDetail(i64),
    Teams { league: String, season: i32 },
    Table { league: String, season: i32 },
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::MatchDetail(id) => write!(f, "match:{id}"),
            CacheKey::Teams { league, season } => write!(f, "teams:{league}:{season}"),
            CacheKey::Table { league, season } => write!(f, "table:{league}:{season}"),
        }
    }
}

/// Counters describing how a store has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from a fresh entry.
    pub hits: u64,
    /// Reads that found no fresh entry (or were forced).
    pub misses: u64,
    /// Misses that attached to an already running fetch.
    pub joins: u64,
    /// Underlying fetches started.
    pub fetches: u64,
    /// Underlying fetches that failed.
    pub failures: u64,
}

/// Size snapshot for monitoring output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
    pub entries: usize,
    pub in_flight: usize,
    pub stats: CacheStats,
}
