// ABOUTME: Stdio transport loop: line-delimited JSON-RPC over stdin/stdout
// ABOUTME: Logs go to stderr; stdout carries only protocol frames
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::McpHandler;
use crate::client::GuruFocusClient;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Serve MCP over stdio until stdin closes or the process receives SIGINT.
pub async fn serve_stdio(client: Arc<GuruFocusClient>) -> Result<()> {
    let handler = McpHandler::new(Arc::clone(&client));
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    info!("mcp server listening on stdio");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        };

        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => handler.handle(request).await,
            Err(e) => {
                warn!(error = %e, "request parse error");
                Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        };

        if let Some(response) = response {
            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            stdout.write_all(&frame).await?;
            stdout.flush().await?;
        }
    }

    client.close().await;
    info!("mcp server stopped");
    Ok(())
}
