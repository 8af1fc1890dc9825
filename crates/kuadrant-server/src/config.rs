use clap::ValueEnum;
use kuadrant_core::{DocCacheConfig, DEFAULT_DOCS_BASE_URL};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// Server-sent event stream per client, requests sent by POST
    Sse,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Contents of `kuadrant-mcp.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub server: ServerConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: Transport,
    /// Listen address for the SSE and HTTP transports. `:8080` binds all interfaces.
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            addr: ":8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub base_url: String,
    pub cache_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for DocsConfig {
    fn default() -> Self {
        let cache = DocCacheConfig::default();
        Self {
            base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            cache_ttl_secs: cache.ttl.as_secs(),
            fetch_timeout_secs: cache.fetch_timeout.as_secs(),
        }
    }
}

impl DocsConfig {
    pub fn cache_config(&self) -> DocCacheConfig {
        DocCacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

impl McpConfig {
    /// Parse a config file. Fails if it is missing or malformed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Parse a config file, or fall back to defaults if it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Every problem found, empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.socket_addr() {
            errors.push(e);
        }

        let base_url = &self.docs.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(format!(
                "docs.base_url must start with http:// or https://, got '{base_url}'"
            ));
        }

        if self.docs.fetch_timeout_secs == 0 {
            errors.push("docs.fetch_timeout_secs must be greater than 0".to_string());
        }

        errors
    }
}

impl ServerConfig {
    /// Resolve `addr`, treating a bare `:port` as `0.0.0.0:port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let addr = match self.addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.addr.clone(),
        };
        addr.parse()
            .map_err(|_| format!("server.addr is not a valid listen address: '{}'", self.addr))
    }
}
