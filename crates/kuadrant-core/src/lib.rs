//! Core building blocks for the Kuadrant MCP server.
//!
//! - [`docs`]: a TTL cache for remote reference documents with static fallbacks.
//! - [`catalog`]: the `kuadrant://` resource URIs and where their content lives.
//! - [`manifests`]: Gateway API and Kuadrant policy manifest builders.

pub mod catalog;
pub mod docs;
pub mod error;
pub mod manifests;

pub use catalog::{Catalog, DocSource, DocTransform, DEFAULT_DOCS_BASE_URL, MARKDOWN_MIME_TYPE};
pub use docs::{
    CacheEntry, CacheStats, Clock, DocCache, DocCacheConfig, DocFetcher, HttpFetcher,
    SystemClock, DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT,
};
pub use error::{DocsError, FetchError, ManifestError, Result};
