use super::clock::{Clock, SystemClock};
use super::fetcher::{DocFetcher, HttpFetcher};
use super::{DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT};
use crate::error::{DocsError, FetchError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Tunables fixed for the lifetime of a [`DocCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocCacheConfig {
    pub ttl: Duration,
    pub fetch_timeout: Duration,
}

impl Default for DocCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Last successful fetch of one source URL. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// `now - fetched_at < ttl`. A clock that moved backwards counts as fresh.
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
}

/// TTL cache of remote text documents keyed by source URL.
///
/// Fresh entries are served under a shared read lock. Stale or missing entries
/// are fetched with no lock held, so a slow remote never stalls readers of
/// other URLs, and the result is stored under a short write lock.
///
/// Two callers that see the same stale entry both fetch it; whichever write
/// lands last is what stays cached. There is no per-key de-duplication.
pub struct DocCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    fetch_timeout: Duration,
    fetcher: Arc<dyn DocFetcher>,
    clock: Arc<dyn Clock>,
}

impl DocCache {
    /// Create an empty cache that reads wall-clock time.
    pub fn new(config: DocCacheConfig, fetcher: Arc<dyn DocFetcher>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl: config.ttl,
            fetch_timeout: config.fetch_timeout,
            fetcher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a cache backed by [`HttpFetcher`].
    pub fn http(config: DocCacheConfig) -> std::result::Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(config.fetch_timeout)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the document at `url`.
    ///
    /// Serves the cached copy while it is fresh, otherwise fetches it again. When
    /// the fetch fails, a non-empty `fallback` is returned as a normal result and
    /// an empty one turns the failure into [`DocsError::FetchFailed`]. A failed
    /// fetch never touches the cached entry.
    pub async fn fetch(&self, url: &str, fallback: &str) -> Result<String> {
        let now = self.clock.now();
        {
            let store = self.store.read().await;
            if let Some(entry) = store.get(url) {
                if entry.is_fresh(now, self.ttl) {
                    debug!(url, "Serving cached document");
                    return Ok(entry.content.clone());
                }
            }
        }

        match self.retrieve(url).await {
            Ok(content) => {
                let entry = CacheEntry {
                    content: content.clone(),
                    fetched_at: self.clock.now(),
                };
                self.store.write().await.insert(url.to_string(), entry);
                debug!(url, bytes = content.len(), "Cached fresh document");
                Ok(content)
            }
            Err(source) if !fallback.is_empty() => {
                warn!(url, error = %source, "Document fetch failed, serving fallback content");
                Ok(fallback.to_string())
            }
            Err(source) => Err(DocsError::FetchFailed {
                url: url.to_string(),
                source,
            }),
        }
    }

    async fn retrieve(&self, url: &str) -> std::result::Result<String, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_text(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        }
    }

    /// Copy of the stored entry for `url`, fresh or not.
    pub async fn entry(&self, url: &str) -> Option<CacheEntry> {
        self.store.read().await.get(url).cloned()
    }

    pub async fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let store = self.store.read().await;
        CacheStats {
            entries: store.len(),
            fresh: store.values().filter(|e| e.is_fresh(now, self.ttl)).count(),
        }
    }
}
