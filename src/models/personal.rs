// ABOUTME: Personal-data DTOs, principally the API usage quota reading
// ABOUTME: The remaining count here is the authoritative source for usage tracker syncs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_optional_i64, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::Value;

/// API usage statistics from the `api_usage` endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiUsage {
    /// Requests consumed in the current quota window.
    pub api_usage: u64,
    /// Requests remaining in the current quota window.
    pub api_requests_remaining: u64,
}

impl ApiUsage {
    /// Parse the raw usage response. Missing fields default to zero.
    pub fn from_api_response(data: &Value) -> GuruFocusResult<Self> {
        let root = require_object(data, "api usage")?;
        Ok(Self {
            api_usage: parse_optional_i64(root.get("api_usage")).unwrap_or(0).max(0) as u64,
            api_requests_remaining: parse_optional_i64(root.get("api_requests_remaining"))
                .unwrap_or(0)
                .max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_usage_counts() {
        let usage =
            ApiUsage::from_api_response(&json!({"api_usage": 158, "api_requests_remaining": "3842"}))
                .unwrap();
        assert_eq!(usage.api_usage, 158);
        assert_eq!(usage.api_requests_remaining, 3842);
    }

    #[test]
    fn empty_response_defaults_to_zero() {
        let usage = ApiUsage::from_api_response(&json!({})).unwrap();
        assert_eq!(usage.api_usage, 0);
        assert_eq!(usage.api_requests_remaining, 0);
    }
}
