// ABOUTME: HTTP transport abstraction over reqwest with a pluggable trait seam
// ABOUTME: Lets the request pipeline run against the real API or a scripted fake in tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP methods used by the GuruFocus API (read-only plus JSON-body POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Raw response handed back to the pipeline for classification.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header in seconds, when present.
    pub retry_after: Option<u64>,
}

/// Transport-level failures, all eligible for retry.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("{0}")]
    Connection(String),
}

/// Minimal HTTP transport contract consumed by the request pipeline.
///
/// The production implementation wraps a pooled [`reqwest::Client`]; tests
/// substitute scripted fakes to drive the pipeline without a network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        json_body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError>;
}

/// Connection-pooled reqwest transport shared by all endpoint calls of a
/// client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given per-request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        json_body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(TransportResponse {
            status,
            body,
            retry_after,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}
