// ABOUTME: MCP protocol dispatch: initialize, ping, tools/list, and tools/call
// ABOUTME: Tool failures return isError results; malformed requests return JSON-RPC errors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::tools::{call_tool, tool_definitions};
use super::{MCP_PROTOCOL_VERSION, SERVER_NAME};
use crate::client::GuruFocusClient;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Protocol handler for one MCP session.
pub struct McpHandler {
    client: Arc<GuruFocusClient>,
}

impl McpHandler {
    /// Create a handler serving data from the given client.
    #[must_use]
    pub fn new(client: Arc<GuruFocusClient>) -> Self {
        Self { client }
    }

    /// Handle one request. Returns `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification received");
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": MCP_PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({"tools": tool_definitions()}),
            ),
            "tools/call" => self.handle_tool_call(id, request.params.as_ref()).await,
            other => {
                warn!(method = other, "unknown method");
                JsonRpcResponse::error(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                )
            }
        };

        Some(response)
    }

    async fn handle_tool_call(
        &self,
        id: Option<Value>,
        params: Option<&Value>,
    ) -> JsonRpcResponse {
        let Some(name) = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
        else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "tools/call requires a tool name",
            );
        };

        let empty_args = json!({});
        let args = params
            .and_then(|p| p.get("arguments"))
            .unwrap_or(&empty_args);

        debug!(tool = name, "tool call");
        match call_tool(&self.client, name, args).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|_| result.to_string());
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{"type": "text", "text": text}],
                        "isError": false,
                    }),
                )
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{"type": "text", "text": e.to_string()}],
                        "isError": true,
                    }),
                )
            }
        }
    }
}
