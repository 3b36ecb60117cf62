// ABOUTME: GuruFocus financial data API client and MCP server library
// ABOUTME: Rate-limited, cached, retrying access to the GuruFocus public API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # GuruFocus MCP Server
//!
//! A client library and MCP (Model Context Protocol) server for the
//! GuruFocus financial data API.
//!
//! The core is the request pipeline of [`client::GuruFocusClient`], which
//! composes four concerns behind one entry point:
//!
//! - **Rate limiting** ([`rate_limiter`]): a token bucket with per-minute
//!   refill and an optional daily ceiling.
//! - **Caching** ([`cache`]): a persistent disk cache with per-category
//!   TTLs, LRU eviction under a byte cap, and pattern invalidation.
//! - **Retry** ([`client`]): exponential backoff for transport failures and
//!   server errors; terminal errors propagate immediately.
//! - **Typed errors** ([`errors`]): a closed taxonomy classified from HTTP
//!   statuses and transport failures.
//!
//! The [`mcp`] module exposes the endpoint layer as MCP tools over stdio.
//!
//! ```no_run
//! use gurufocus_mcp_server::client::GuruFocusClient;
//! use gurufocus_mcp_server::config::GuruFocusConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GuruFocusConfig::builder().api_token("your-token").build()?;
//! let client = GuruFocusClient::new(config);
//! let summary = client.stocks().get_summary("AAPL", false).await?;
//! println!("GF score: {:?}", summary.quality.gf_score);
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod jsonrpc;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod pagination;
pub mod rate_limiter;
pub mod transport;
pub mod usage_tracker;

pub use client::GuruFocusClient;
pub use config::GuruFocusConfig;
pub use errors::{GuruFocusError, GuruFocusResult};
