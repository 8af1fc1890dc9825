//! Remote reference documents with time-based caching.
//!
//! [`DocCache`] keeps the last successful fetch of every source URL and serves it
//! until the TTL runs out. On a failed refresh it returns the caller's static
//! fallback text instead, or an error when no fallback exists.

mod cache;
mod clock;
mod fetcher;

pub use cache::{CacheEntry, CacheStats, DocCache, DocCacheConfig};
pub use clock::{Clock, SystemClock};
pub use fetcher::{DocFetcher, HttpFetcher};

use std::time::Duration;

/// How long a fetched document stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Upper bound on a single remote retrieval.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
pub(crate) mod testing;
