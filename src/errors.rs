// ABOUTME: Typed error taxonomy for the GuruFocus API client and MCP server
// ABOUTME: Classifies HTTP statuses and transport failures into a closed set of error kinds
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use thiserror::Error;

/// Maximum number of response-body characters embedded in an [`GuruFocusError::Api`] error.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// Closed set of failure kinds surfaced by the client.
///
/// Every upstream response and transport failure is classified into exactly
/// one of these variants. Retry policy is derived from the variant via
/// [`GuruFocusError::is_retryable`].
#[derive(Debug, Clone, Error)]
pub enum GuruFocusError {
    /// Invalid or missing API token (HTTP 401/403, or no token at construction).
    #[error("{0}")]
    Authentication(String),

    /// Local limiter exhaustion or upstream HTTP 429.
    #[error("{message}")]
    RateLimited {
        message: String,
        /// Seconds until a retry can reasonably succeed, when known.
        retry_after: Option<u64>,
    },

    /// HTTP 404 on a `stock/<SYMBOL>/...` endpoint.
    #[error("Invalid symbol: {symbol}. Verify the ticker (and exchange suffix, e.g. XTER:DAI) and try again")]
    InvalidSymbol { symbol: String },

    /// HTTP 404 on a non-stock endpoint.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other 4xx/5xx, or a JSON decode failure on a 2xx response.
    #[error("{message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        /// Response body, truncated to [`MAX_ERROR_BODY_CHARS`].
        body: String,
    },

    /// Connect failure, timeout, DNS failure, or peer reset.
    #[error("Network error: {0}")]
    Network(String),

    /// Response shape fundamentally incompatible with the expected contract.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl GuruFocusError {
    /// Build an [`GuruFocusError::Api`] from a status and raw body, truncating the body.
    #[must_use]
    pub fn api(message: impl Into<String>, status_code: u16, body: &str) -> Self {
        Self::Api {
            message: message.into(),
            status_code: Some(status_code),
            body: truncate_body(body),
        }
    }

    /// Authentication failure with a hint pointing at the token configuration.
    #[must_use]
    pub fn missing_token() -> Self {
        Self::Authentication(
            "API token not configured. Set GURUFOCUS_API_TOKEN or pass api_token explicitly"
                .into(),
        )
    }

    /// Whether the pipeline may retry after this error.
    ///
    /// Only transport-level failures and server-class (5xx) API errors are
    /// retryable. Everything else is terminal.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status_code, .. } => matches!(status_code, Some(code) if *code >= 500),
            _ => false,
        }
    }

    /// HTTP status carried by this error, when one applies.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => *status_code,
            Self::Authentication(_) => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::InvalidSymbol { .. } | Self::NotFound(_) => Some(404),
            Self::Network(_) | Self::Validation(_) => None,
        }
    }

    /// Classify an HTTP response status into a typed result.
    ///
    /// Returns `Ok(())` for 2xx statuses (the caller then decodes the body)
    /// and the matching error variant otherwise. `endpoint` provides the
    /// context for distinguishing [`GuruFocusError::InvalidSymbol`] from a
    /// plain [`GuruFocusError::NotFound`].
    pub fn classify_status(
        status: u16,
        body: &str,
        endpoint: &str,
        retry_after: Option<u64>,
    ) -> Result<(), Self> {
        match status {
            200..=299 => Ok(()),
            429 => Err(Self::RateLimited {
                message: "API rate limit exceeded".into(),
                retry_after,
            }),
            401 => Err(Self::Authentication("Invalid or missing API token".into())),
            403 => Err(Self::Authentication(
                "Access forbidden - check API token permissions".into(),
            )),
            404 => Err(symbol_from_endpoint(endpoint).map_or_else(
                || Self::NotFound(endpoint.to_owned()),
                |symbol| Self::InvalidSymbol { symbol },
            )),
            400..=499 => Err(Self::api(format!("Client error: {status}"), status, body)),
            _ => Err(Self::api(format!("Server error: {status}"), status, body)),
        }
    }
}

/// Extract the symbol from a `stock/<SYMBOL>/...` endpoint path, if present.
///
/// The returned symbol preserves the casing used in the path; callers that
/// need the canonical form upper-case it themselves.
#[must_use]
pub fn symbol_from_endpoint(endpoint: &str) -> Option<String> {
    let mut parts = endpoint.trim_start_matches('/').split('/');
    match (parts.next(), parts.next()) {
        (Some("stock"), Some(symbol)) if !symbol.is_empty() => Some(symbol.to_owned()),
        _ => None,
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Result alias used throughout the client.
pub type GuruFocusResult<T> = Result<T, GuruFocusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_2xx_is_ok() {
        assert!(GuruFocusError::classify_status(200, "", "stock/AAPL/summary", None).is_ok());
        assert!(GuruFocusError::classify_status(204, "", "gurulist", None).is_ok());
    }

    #[test]
    fn classify_404_on_stock_path_is_invalid_symbol() {
        let err = GuruFocusError::classify_status(404, "", "stock/ZZZZ/summary", None).unwrap_err();
        match err {
            GuruFocusError::InvalidSymbol { symbol } => assert_eq!(symbol, "ZZZZ"),
            other => panic!("expected InvalidSymbol, got {other:?}"),
        }
    }

    #[test]
    fn classify_404_elsewhere_is_not_found() {
        let err = GuruFocusError::classify_status(404, "", "gurulist", None).unwrap_err();
        assert!(matches!(err, GuruFocusError::NotFound(_)));
    }

    #[test]
    fn classify_leading_slash_still_extracts_symbol() {
        let err =
            GuruFocusError::classify_status(404, "", "/stock/MSFT/financials", None).unwrap_err();
        assert!(matches!(err, GuruFocusError::InvalidSymbol { symbol } if symbol == "MSFT"));
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        let server =
            GuruFocusError::classify_status(503, "", "stock/AAPL/summary", None).unwrap_err();
        assert!(server.is_retryable());

        let client =
            GuruFocusError::classify_status(400, "", "stock/AAPL/summary", None).unwrap_err();
        assert!(!client.is_retryable());

        assert!(GuruFocusError::Network("reset".into()).is_retryable());
        assert!(!GuruFocusError::RateLimited {
            message: "limit".into(),
            retry_after: Some(1)
        }
        .is_retryable());
    }

    #[test]
    fn api_error_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = GuruFocusError::api("Server error: 500", 500, &body);
        match err {
            GuruFocusError::Api { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
