// ABOUTME: GuruFocus API client owning the transport, cache, rate limiter, and usage tracker
// ABOUTME: Single request pipeline: rate-limit gate, HTTP call, classification, retry with backoff
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::CacheManager;
use crate::config::GuruFocusConfig;
use crate::endpoints::{InsidersEndpoint, PersonalEndpoint, StocksEndpoint};
use crate::errors::{symbol_from_endpoint, GuruFocusError, GuruFocusResult};
use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::transport::{HttpMethod, HttpTransport, ReqwestTransport};
use crate::usage_tracker::{UsageTracker, UsageTrackerConfig};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, field, info, info_span, warn, Instrument};

/// Async client for the GuruFocus API.
///
/// Exclusively owns one HTTP transport, one cache manager, one rate limiter,
/// and one usage tracker. Endpoint objects borrow the client for lookups and
/// carry no lifecycle responsibility.
///
/// The transport and cache manager are created lazily on first use and
/// released by [`GuruFocusClient::close`]; a closed client transparently
/// rebuilds transport state on the next request while the persistent cache
/// directory is preserved.
///
/// ```no_run
/// # use gurufocus_mcp_server::client::GuruFocusClient;
/// # use gurufocus_mcp_server::config::GuruFocusConfig;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GuruFocusConfig::from_env()?;
/// let client = GuruFocusClient::new(config);
/// let summary = client.stocks().get_summary("AAPL", false).await?;
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct GuruFocusClient {
    config: GuruFocusConfig,
    transport: RwLock<Option<Arc<dyn HttpTransport>>>,
    cache: RwLock<Option<Arc<CacheManager>>>,
    rate_limiter: Arc<RateLimiter>,
    usage_tracker: Arc<UsageTracker>,
}

impl GuruFocusClient {
    /// Create a client from a resolved configuration.
    ///
    /// The rate limiter and usage tracker are created immediately (null
    /// variants when disabled); transport and cache are deferred until the
    /// first request.
    #[must_use]
    pub fn new(config: GuruFocusConfig) -> Self {
        let rate_limiter = if config.rate_limit_enabled {
            RateLimiter::new(RateLimitConfig {
                requests_per_minute: config.rate_limit_rpm,
                requests_per_day: config.rate_limit_daily,
                burst_size: config.rate_limit_burst,
            })
        } else {
            RateLimiter::disabled()
        };

        let usage_tracker = if config.usage_tracking_enabled {
            UsageTracker::new(UsageTrackerConfig {
                enabled: true,
                sync_interval: Duration::from_secs(config.usage_sync_interval_seconds),
                warn_threshold_percent: config.usage_warn_percent,
                daily_limit: config.usage_daily_limit,
            })
        } else {
            UsageTracker::disabled()
        };

        Self {
            config,
            transport: RwLock::new(None),
            cache: RwLock::new(None),
            rate_limiter: Arc::new(rate_limiter),
            usage_tracker: Arc::new(usage_tracker),
        }
    }

    /// Create a client with a pre-supplied transport (custom pooling,
    /// instrumentation, or a scripted fake in tests).
    #[must_use]
    pub fn with_transport(config: GuruFocusConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let client = Self::new(config);
        Self {
            transport: RwLock::new(Some(transport)),
            ..client
        }
    }

    /// Create a client with a pre-supplied cache manager.
    #[must_use]
    pub fn with_cache_manager(config: GuruFocusConfig, cache: Arc<CacheManager>) -> Self {
        let client = Self::new(config);
        Self {
            cache: RwLock::new(Some(cache)),
            ..client
        }
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &GuruFocusConfig {
        &self.config
    }

    /// The client's rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.rate_limiter)
    }

    /// The client's usage tracker.
    #[must_use]
    pub fn usage_tracker(&self) -> Arc<UsageTracker> {
        Arc::clone(&self.usage_tracker)
    }

    /// Whether an HTTP transport is currently alive.
    pub async fn is_connected(&self) -> bool {
        self.transport.read().await.is_some()
    }

    /// Eagerly create the transport and cache, and seed the usage tracker
    /// from its persisted snapshot.
    pub async fn connect(&self) -> GuruFocusResult<()> {
        self.ensure_transport().await;
        let cache = self.ensure_cache().await;
        self.usage_tracker.initialize(cache).await;
        Ok(())
    }

    /// Release the HTTP transport and close the cache manager.
    ///
    /// Idempotent. The persistent cache directory survives; a later request
    /// rebuilds transport and cache state.
    pub async fn close(&self) {
        if let Some(_transport) = self.transport.write().await.take() {
            debug!("http transport released");
        }
        if let Some(cache) = self.cache.write().await.take() {
            cache.close().await;
        }
    }

    /// The cache manager, created on first use.
    pub async fn cache(&self) -> Arc<CacheManager> {
        self.ensure_cache().await
    }

    /// Stock data endpoints.
    #[must_use]
    pub const fn stocks(&self) -> StocksEndpoint<'_> {
        StocksEndpoint::new(self)
    }

    /// Insider activity endpoints.
    #[must_use]
    pub const fn insiders(&self) -> InsidersEndpoint<'_> {
        InsidersEndpoint::new(self)
    }

    /// Personal data endpoints (API usage, screeners).
    #[must_use]
    pub const fn personal(&self) -> PersonalEndpoint<'_> {
        PersonalEndpoint::new(self)
    }

    async fn ensure_transport(&self) -> Arc<dyn HttpTransport> {
        if let Some(transport) = self.transport.read().await.as_ref() {
            return Arc::clone(transport);
        }
        let mut guard = self.transport.write().await;
        if let Some(transport) = guard.as_ref() {
            return Arc::clone(transport);
        }
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(
            Duration::from_secs_f64(self.config.timeout_seconds),
        ));
        *guard = Some(Arc::clone(&transport));
        debug!("http transport created");
        transport
    }

    async fn ensure_cache(&self) -> Arc<CacheManager> {
        if let Some(cache) = self.cache.read().await.as_ref() {
            return Arc::clone(cache);
        }
        let mut guard = self.cache.write().await;
        if let Some(cache) = guard.as_ref() {
            return Arc::clone(cache);
        }
        let cache = Arc::new(if self.config.cache_enabled {
            CacheManager::new(&self.config.cache_dir, self.config.cache_size_limit_bytes)
        } else {
            CacheManager::disabled()
        });
        *guard = Some(Arc::clone(&cache));
        cache
    }

    /// Build the full URL for an endpoint path.
    ///
    /// The GuruFocus API carries the token as a path segment:
    /// `https://api.gurufocus.com/public/user/{token}/stock/{symbol}/summary`.
    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_token,
            endpoint.trim_start_matches('/')
        )
    }

    /// Make a GET request to the API.
    pub async fn get(
        &self,
        endpoint: &str,
        params: Option<&[(String, String)]>,
    ) -> GuruFocusResult<Value> {
        self.request(HttpMethod::Get, endpoint, params, None).await
    }

    /// Make a POST request to the API.
    pub async fn post(
        &self,
        endpoint: &str,
        json_body: Option<Value>,
        params: Option<&[(String, String)]>,
    ) -> GuruFocusResult<Value> {
        self.request(HttpMethod::Post, endpoint, params, json_body)
            .await
    }

    /// Make an HTTP request to the GuruFocus API.
    ///
    /// The single pipeline behind every endpoint call: acquires a rate-limit
    /// token, issues the request, classifies the response, and retries
    /// transport failures and server errors with exponential backoff.
    /// Terminal errors (authentication, rate limit, invalid symbol, client
    /// errors) propagate immediately.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&[(String, String)]>,
        json_body: Option<Value>,
    ) -> GuruFocusResult<Value> {
        let request_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
        let symbol = symbol_from_endpoint(endpoint).map(|s| s.to_uppercase());

        let span = info_span!(
            "api_request",
            %method,
            endpoint,
            %request_id,
            symbol = field::Empty,
            status_code = field::Empty,
            duration_ms = field::Empty,
            retry_count = field::Empty,
        );
        if let Some(symbol) = &symbol {
            span.record("symbol", symbol.as_str());
        }

        self.request_inner(method, endpoint, params, json_body)
            .instrument(span)
            .await
    }

    async fn request_inner(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&[(String, String)]>,
        json_body: Option<Value>,
    ) -> GuruFocusResult<Value> {
        let transport = self.ensure_transport().await;
        let url = self.build_url(endpoint);
        let query: Vec<(String, String)> = params.map(<[_]>::to_vec).unwrap_or_default();
        let start = tokio::time::Instant::now();
        let span = tracing::Span::current();

        let mut last_error: Option<GuruFocusError> = None;

        for attempt in 0..=self.config.max_retries {
            // One token per attempt. Local limiter exhaustion is terminal:
            // the quota signal must reach the caller, not the retry loop.
            self.rate_limiter.acquire_or_raise(None).await?;

            debug!(
                attempt = attempt + 1,
                max_attempts = self.config.max_retries + 1,
                "api request attempt"
            );

            match transport
                .execute(method, &url, &query, json_body.as_ref())
                .await
            {
                Ok(response) => {
                    match GuruFocusError::classify_status(
                        response.status,
                        &response.body,
                        endpoint,
                        response.retry_after,
                    ) {
                        Ok(()) => {
                            let value: Value = match serde_json::from_str(&response.body) {
                                Ok(value) => value,
                                Err(e) => {
                                    // A 2xx body that does not decode is a
                                    // terminal API error, never retried.
                                    let err = GuruFocusError::api(
                                        format!("Invalid JSON response: {e}"),
                                        response.status,
                                        &response.body,
                                    );
                                    record_outcome(&span, Some(response.status), start, attempt);
                                    return Err(err);
                                }
                            };

                            self.usage_tracker.decrement().await;
                            record_outcome(&span, Some(response.status), start, attempt);
                            info!(
                                status_code = response.status,
                                duration_ms = start.elapsed().as_millis() as u64,
                                "api request success"
                            );
                            return Ok(value);
                        }
                        Err(err) if err.is_retryable() => {
                            warn!(
                                attempt = attempt + 1,
                                status_code = response.status,
                                error = %err,
                                "api request server error"
                            );
                            last_error = Some(err);
                        }
                        Err(err) => {
                            record_outcome(&span, err.status_code(), start, attempt);
                            warn!(error = %err, "api request failed");
                            return Err(err);
                        }
                    }
                }
                Err(transport_err) => {
                    warn!(
                        attempt = attempt + 1,
                        error = %transport_err,
                        "api request transport error"
                    );
                    last_error = Some(GuruFocusError::Network(transport_err.to_string()));
                }
            }

            if attempt < self.config.max_retries {
                let delay = Duration::from_secs_f64(
                    self.config.retry_delay_seconds * f64::from(1_u32 << attempt),
                );
                debug!(delay_seconds = delay.as_secs_f64(), "api request retry wait");
                tokio::time::sleep(delay).await;
            }
        }

        record_outcome(&span, None, start, self.config.max_retries);
        let err = last_error
            .unwrap_or_else(|| GuruFocusError::Network("Request failed after all retries".into()));
        error!(
            total_attempts = self.config.max_retries + 1,
            error = %err,
            "api request failed after all retries"
        );
        Err(err)
    }
}

fn record_outcome(
    span: &tracing::Span,
    status_code: Option<u16>,
    start: tokio::time::Instant,
    attempt: u32,
) {
    if let Some(status) = status_code {
        span.record("status_code", status);
    }
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    span.record("retry_count", attempt);
}
