//! Application-wide constants and configuration defaults
//!
//! This module centralizes the magic numbers of the fetch layer so the
//! config defaults, validation bounds and tests agree on them.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// Default primary board API base
pub const DEFAULT_API_DOMAIN: &str = "http://localhost:8000/api";

/// Default secondary (OpenLigaDB) API base
pub const DEFAULT_OPENLIGA_DOMAIN: &str = "https://api.openligadb.de";

/// Competition used when nothing else is configured
pub const DEFAULT_COMPETITION: &str = "bl1";

/// Cache TTL values in seconds
pub mod cache_ttl {
    /// Default TTL for secondary lookups (5 minutes)
    pub const DEFAULT_SECONDS: u64 = 300;
}

/// Board window bounds
pub mod window {
    /// Upper bound for look-back and look-ahead days
    pub const MAX_DAYS: u32 = 365;

    /// Default look-back days
    pub const DEFAULT_DAYS_BACK: u32 = 7;

    /// Default look-ahead days
    pub const DEFAULT_DAYS_AHEAD: u32 = 7;
}

/// Refresh cadence
pub mod refresh {
    /// Default periodic refresh interval
    pub const DEFAULT_SECONDS: u64 = 30;

    /// Upper clamp for the refresh interval. 0 disables periodic refresh.
    pub const MAX_SECONDS: u64 = 3600;
}

/// History pagination
pub mod history {
    /// How far back the history load reaches on its first attempt
    pub const DEFAULT_DAYS_BACK: u32 = 120;

    /// Bounded request used when the deep history request is rejected.
    /// Matches the board backend's own window limit.
    pub const FALLBACK_DAYS_BACK: u32 = 30;

    /// Rounds shown per history page
    pub const DEFAULT_ROUNDS_PER_PAGE: usize = 3;
}
