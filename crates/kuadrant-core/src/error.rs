use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocsError>;

/// Errors surfaced by [`crate::DocCache::fetch`].
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },
}

impl DocsError {
    /// URL of the document that could not be retrieved.
    pub fn url(&self) -> &str {
        match self {
            DocsError::FetchFailed { url, .. } => url,
        }
    }
}

/// A single failed retrieval. Every variant is handled the same way by the cache.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Invalid tool parameters for a manifest builder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to generate YAML: {0}")]
    Yaml(String),
}

impl From<serde_yaml_ng::Error> for ManifestError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ManifestError::Yaml(err.to_string())
    }
}
