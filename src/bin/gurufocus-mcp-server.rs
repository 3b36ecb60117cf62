// ABOUTME: CLI entry point for the GuruFocus MCP server
// ABOUTME: Resolves configuration, initializes logging, and serves MCP over stdio
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use clap::Parser;
use gurufocus_mcp_server::config::{GuruFocusConfig, LogFormat};
use gurufocus_mcp_server::logging::LoggingConfig;
use gurufocus_mcp_server::mcp::serve_stdio;
use gurufocus_mcp_server::GuruFocusClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "gurufocus-mcp-server",
    about = "GuruFocus financial data MCP server",
    version
)]
struct Args {
    /// API token (overrides GURUFOCUS_API_TOKEN)
    #[arg(long)]
    api_token: Option<String>,

    /// Cache directory (overrides GURUFOCUS_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Disable the persistent response cache
    #[arg(long)]
    no_cache: bool,

    /// Disable local rate limiting
    #[arg(long)]
    no_rate_limit: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON instead of console format
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = GuruFocusConfig::builder();
    if let Some(token) = args.api_token {
        builder = builder.api_token(token);
    }
    if let Some(dir) = args.cache_dir {
        builder = builder.cache_dir(dir);
    }
    if args.no_cache {
        builder = builder.cache_enabled(false);
    }
    if args.no_rate_limit {
        builder = builder.rate_limit_enabled(false);
    }
    if let Some(level) = args.log_level {
        builder = builder.log_level(level);
    }
    if args.log_json {
        builder = builder.log_format(LogFormat::Json);
    }

    let config = builder.build().map_err(|e| anyhow::anyhow!("{e}"))?;

    LoggingConfig::from_config(&config).init()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        cache_enabled = config.cache_enabled,
        rate_limit_enabled = config.rate_limit_enabled,
        "starting gurufocus mcp server"
    );

    let client = Arc::new(GuruFocusClient::new(config));
    client.connect().await.map_err(|e| anyhow::anyhow!("{e}"))?;

    serve_stdio(client).await
}
