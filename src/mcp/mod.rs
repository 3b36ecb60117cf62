// ABOUTME: MCP server layer exposing GuruFocus data as tools over JSON-RPC
// ABOUTME: Protocol dispatch, tool registry, and the stdio transport loop
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod protocol;
pub mod server;
pub mod tools;

pub use protocol::McpHandler;
pub use server::serve_stdio;

/// Protocol revision implemented by this server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised during initialization.
pub const SERVER_NAME: &str = "gurufocus-mcp-server";
