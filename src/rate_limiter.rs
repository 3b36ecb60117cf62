// ABOUTME: Token bucket rate limiter with per-minute refill and daily request ceiling
// ABOUTME: Serializes concurrent acquirers through one async lock held across the wait loop
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{GuruFocusError, GuruFocusResult};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Rate limiting parameters.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Token refill rate, requests per minute. Fractional rates allowed.
    pub requests_per_minute: f64,
    /// Daily request ceiling. 0 means unlimited.
    pub requests_per_day: u64,
    /// Bucket capacity: the largest burst that can pass without waiting.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 10.0,
            requests_per_day: 0,
            burst_size: 5,
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_update: Instant,
    daily_count: u64,
    daily_epoch: Instant,
}

impl BucketState {
    fn new(burst_size: u32) -> Self {
        let now = Instant::now();
        Self {
            tokens: f64::from(burst_size),
            last_update: now,
            daily_count: 0,
            daily_epoch: now,
        }
    }

    /// Lazily refill tokens from elapsed time, capped at the burst size.
    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        let tokens_per_second = config.requests_per_minute / 60.0;
        self.tokens =
            (self.tokens + elapsed * tokens_per_second).min(f64::from(config.burst_size));
    }

    /// Reset the daily counter once a full day has elapsed since its epoch.
    fn check_daily_reset(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.daily_epoch).as_secs() >= SECONDS_PER_DAY {
            self.daily_count = 0;
            self.daily_epoch = now;
            debug!("daily rate limit counter reset");
        }
    }

    fn daily_exhausted(&self, config: &RateLimitConfig) -> bool {
        config.requests_per_day > 0 && self.daily_count >= config.requests_per_day
    }

    /// Seconds until one full token is available. Zero when one is ready,
    /// unbounded when the refill rate is non-positive.
    fn time_until_available(&self, config: &RateLimitConfig) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        let tokens_per_second = config.requests_per_minute / 60.0;
        if tokens_per_second <= 0.0 {
            return Duration::MAX;
        }
        Duration::from_secs_f64((1.0 - self.tokens) / tokens_per_second)
    }

    fn seconds_until_daily_reset(&self) -> u64 {
        let elapsed = Instant::now().duration_since(self.daily_epoch).as_secs();
        SECONDS_PER_DAY.saturating_sub(elapsed)
    }
}

/// Token bucket rate limiter for upstream API requests.
///
/// Tokens refill continuously at the configured rate and each request
/// consumes one. Acquirers are granted tokens in the order they entered
/// [`RateLimiter::acquire`]: the internal lock is held across the wait loop,
/// so a waiter keeps its place while sleeping.
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
    enabled: bool,
}

impl RateLimiter {
    /// Create a limiter with the given configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let state = Mutex::new(BucketState::new(config.burst_size));
        Self {
            config,
            state,
            enabled: true,
        }
    }

    /// Null variant for disabled-rate-limit mode: every operation succeeds
    /// immediately without touching any state.
    #[must_use]
    pub fn disabled() -> Self {
        let config = RateLimitConfig::default();
        let state = Mutex::new(BucketState::new(config.burst_size));
        Self {
            config,
            state,
            enabled: false,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Whether a token could be acquired right now, without waiting.
    pub async fn can_acquire(&self) -> bool {
        if !self.enabled {
            return true;
        }
        let mut state = self.state.lock().await;
        state.refill(&self.config);
        state.check_daily_reset();
        !state.daily_exhausted(&self.config) && state.tokens >= 1.0
    }

    /// Time until the next token is available. Zero if one is ready now.
    pub async fn time_until_available(&self) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let mut state = self.state.lock().await;
        state.refill(&self.config);
        state.time_until_available(&self.config)
    }

    /// Acquire one token, sleeping until one refills.
    ///
    /// Returns `false` without sleeping when the daily ceiling is reached,
    /// or when `timeout` elapses before a token becomes available.
    pub async fn acquire(&self, timeout: Option<Duration>) -> bool {
        if !self.enabled {
            return true;
        }

        let mut state = self.state.lock().await;
        let start = Instant::now();

        loop {
            state.refill(&self.config);
            state.check_daily_reset();

            // Daily ceiling first: waiting cannot help within this call.
            if state.daily_exhausted(&self.config) {
                warn!(
                    daily_count = state.daily_count,
                    daily_limit = self.config.requests_per_day,
                    "daily rate limit exceeded"
                );
                return false;
            }

            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                state.daily_count += 1;
                debug!(
                    tokens_remaining = state.tokens,
                    daily_count = state.daily_count,
                    "rate limit token acquired"
                );
                return true;
            }

            let mut wait = state.time_until_available(&self.config);
            if let Some(timeout) = timeout {
                let remaining = timeout.saturating_sub(start.elapsed());
                if remaining.is_zero() {
                    debug!("rate limit acquire timed out");
                    return false;
                }
                wait = wait.min(remaining);
            }
            if wait == Duration::MAX {
                debug!("rate limiter has a non-positive refill rate, cannot wait");
                return false;
            }

            debug!(wait_seconds = wait.as_secs_f64(), "rate limited, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Acquire one token or raise [`GuruFocusError::RateLimited`] carrying
    /// the seconds until a retry can succeed.
    pub async fn acquire_or_raise(&self, timeout: Option<Duration>) -> GuruFocusResult<()> {
        if self.acquire(timeout).await {
            return Ok(());
        }

        let state = self.state.lock().await;
        if state.daily_exhausted(&self.config) {
            return Err(GuruFocusError::RateLimited {
                message: "Daily API rate limit exceeded".into(),
                retry_after: Some(state.seconds_until_daily_reset()),
            });
        }
        let wait = state.time_until_available(&self.config);
        drop(state);
        let retry_after = if wait == Duration::MAX {
            None
        } else {
            Some(wait.as_secs() + 1)
        };
        Err(GuruFocusError::RateLimited {
            message: "Rate limit exceeded".into(),
            retry_after,
        })
    }

    /// Reset bucket and daily counter to their initial state.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = BucketState::new(self.config.burst_size);
    }

    /// Remaining daily requests, or `None` when unlimited.
    pub async fn daily_remaining(&self) -> Option<u64> {
        if self.config.requests_per_day == 0 {
            return None;
        }
        let state = self.state.lock().await;
        Some(self.config.requests_per_day.saturating_sub(state.daily_count))
    }

    /// Current limiter statistics.
    pub async fn stats(&self) -> RateLimiterStats {
        let mut state = self.state.lock().await;
        state.refill(&self.config);
        let time_until_available = state.time_until_available(&self.config);
        RateLimiterStats {
            enabled: self.enabled,
            tokens: state.tokens,
            burst_size: self.config.burst_size,
            requests_per_minute: self.config.requests_per_minute,
            daily_count: state.daily_count,
            daily_limit: (self.config.requests_per_day > 0)
                .then_some(self.config.requests_per_day),
            daily_remaining: (self.config.requests_per_day > 0).then(|| {
                self.config.requests_per_day.saturating_sub(state.daily_count)
            }),
            time_until_available_seconds: if time_until_available == Duration::MAX {
                f64::INFINITY
            } else {
                time_until_available.as_secs_f64()
            },
        }
    }
}

/// Point-in-time limiter statistics.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub enabled: bool,
    pub tokens: f64,
    pub burst_size: u32,
    pub requests_per_minute: f64,
    pub daily_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_remaining: Option<u64>,
    pub time_until_available_seconds: f64,
}
