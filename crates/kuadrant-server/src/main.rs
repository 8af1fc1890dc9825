mod cli;
mod config;
mod mcp;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Transport;
use kuadrant_core::{Catalog, DocCache};
use mcp::McpServer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the stdio JSON-RPC stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Config(cmd)) = &cli.command {
        return cli::config_cmd::run(*cmd, &cli);
    }

    let config = cli.resolve_config();
    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    info!("Starting Kuadrant MCP server v{}", env!("CARGO_PKG_VERSION"));
    info!("Transport: {:?}", config.server.transport);
    info!(
        "Docs: {} (cache ttl {}s, fetch timeout {}s)",
        config.docs.base_url, config.docs.cache_ttl_secs, config.docs.fetch_timeout_secs
    );

    let cache = DocCache::http(config.docs.cache_config()).context("Failed to build HTTP client")?;
    let server = Arc::new(McpServer::new(
        Arc::new(cache),
        Catalog::new(config.docs.base_url.as_str()),
    ));

    match config.server.transport {
        Transport::Stdio => transport::stdio::run(server).await,
        Transport::Sse => {
            let addr = config.server.socket_addr().map_err(anyhow::Error::msg)?;
            transport::sse::serve(server, addr).await
        }
        Transport::Http => {
            let addr = config.server.socket_addr().map_err(anyhow::Error::msg)?;
            transport::http::serve(server, addr).await
        }
    }
}
