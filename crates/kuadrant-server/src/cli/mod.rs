pub mod config_cmd;

use crate::config::{McpConfig, Transport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "kuadrant-mcp")]
#[command(version, about = "MCP server for Kuadrant manifests and reference docs")]
pub struct Cli {
    /// Path to kuadrant-mcp.toml
    #[arg(
        long,
        global = true,
        env = "KUADRANT_MCP_CONFIG",
        default_value = "kuadrant-mcp.toml"
    )]
    pub config: PathBuf,

    /// Transport to serve MCP on (overrides config file)
    #[arg(long, global = true, env = "KUADRANT_MCP_TRANSPORT", value_enum)]
    pub transport: Option<Transport>,

    /// Listen address for the SSE and HTTP transports, e.g. `:8080` or `127.0.0.1:8080`
    #[arg(long, global = true, env = "KUADRANT_MCP_ADDR")]
    pub addr: Option<String>,

    /// Root URL the documentation resources are fetched from
    #[arg(long, global = true, env = "KUADRANT_DOCS_BASE_URL")]
    pub docs_base_url: Option<String>,

    /// How long a fetched document is served from cache
    #[arg(long, global = true, env = "KUADRANT_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Upper bound on a single document fetch
    #[arg(long, global = true, env = "KUADRANT_FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommands {
    /// Validate the config file and flag overrides
    Validate,
    /// Print the effective configuration as TOML
    Show,
}

impl Cli {
    /// Flags and env vars win over the file, which wins over defaults.
    pub fn apply_overrides(&self, mut config: McpConfig) -> McpConfig {
        if let Some(transport) = self.transport {
            config.server.transport = transport;
        }
        if let Some(addr) = &self.addr {
            config.server.addr = addr.clone();
        }
        if let Some(base_url) = &self.docs_base_url {
            config.docs.base_url = base_url.clone();
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.docs.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = self.fetch_timeout_secs {
            config.docs.fetch_timeout_secs = timeout;
        }
        config
    }

    /// The configuration the server runs with.
    pub fn resolve_config(&self) -> McpConfig {
        self.apply_overrides(McpConfig::load_or_default(&self.config))
    }
}
