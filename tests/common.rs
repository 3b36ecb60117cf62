// ABOUTME: Shared test helpers: scripted fake HTTP transport and client builders
// ABOUTME: Lets pipeline and endpoint tests run against literal responses with no network
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(dead_code)]

use async_trait::async_trait;
use gurufocus_mcp_server::config::GuruFocusConfig;
use gurufocus_mcp_server::transport::{
    HttpMethod, HttpTransport, TransportError, TransportResponse,
};
use gurufocus_mcp_server::GuruFocusClient;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One request observed by the fake transport.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// Scripted HTTP transport: responses are consumed in push order.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response with the given status.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(TransportResponse {
            status,
            body: body.to_string(),
            retry_after: None,
        });
    }

    /// Queue a plain-body response with the given status.
    pub fn push_status(&self, status: u16, body: &str) {
        self.push_response(TransportResponse {
            status,
            body: body.to_owned(),
            retry_after: None,
        });
    }

    pub fn push_response(&self, response: TransportResponse) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Number of HTTP calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        _json_body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_owned(),
            query: query.to_vec(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connection(
                    "fake transport script exhausted".into(),
                ))
            })
    }
}

/// Config pointing the cache at a fresh temp directory.
pub fn test_config(cache_dir: &TempDir) -> GuruFocusConfig {
    GuruFocusConfig::builder()
        .api_token("test-token")
        .cache_dir(cache_dir.path())
        .retry_delay_seconds(0.1)
        .build()
        .unwrap()
}

/// Client wired to a scripted transport and a temp cache directory.
pub fn test_client(cache_dir: &TempDir, transport: Arc<FakeTransport>) -> GuruFocusClient {
    GuruFocusClient::with_transport(test_config(cache_dir), transport)
}
