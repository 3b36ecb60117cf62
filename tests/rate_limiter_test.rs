// ABOUTME: Integration tests for the token bucket rate limiter under paused tokio time
// ABOUTME: Token bounds, lazy refill, daily ceiling, timeouts, and the null variant
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use gurufocus_mcp_server::errors::GuruFocusError;
use gurufocus_mcp_server::rate_limiter::{RateLimitConfig, RateLimiter};
use std::time::Duration;
use tokio::time::Instant;

fn limiter(rpm: f64, daily: u64, burst: u32) -> RateLimiter {
    RateLimiter::new(RateLimitConfig {
        requests_per_minute: rpm,
        requests_per_day: daily,
        burst_size: burst,
    })
}

#[tokio::test(start_paused = true)]
async fn burst_capacity_is_granted_without_waiting() {
    let limiter = limiter(60.0, 0, 5);
    let start = Instant::now();

    for _ in 0..5 {
        assert!(limiter.acquire(None).await);
    }

    assert_eq!(start.elapsed(), Duration::ZERO);
    let stats = limiter.stats().await;
    assert!(stats.tokens < 1.0);
    assert_eq!(stats.daily_count, 5);
}

#[tokio::test(start_paused = true)]
async fn tokens_stay_within_bounds() {
    let limiter = limiter(60.0, 0, 3);

    // Drain the bucket.
    for _ in 0..3 {
        assert!(limiter.acquire(None).await);
    }
    assert!(limiter.stats().await.tokens >= 0.0);

    // A long idle period refills to the cap, never beyond.
    tokio::time::advance(Duration::from_secs(3600)).await;
    let stats = limiter.stats().await;
    assert!(stats.tokens <= 3.0);
    assert!((stats.tokens - 3.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn exhausted_bucket_blocks_until_refill() {
    // 60 rpm, burst 1: the second acquire must wait a full second.
    let limiter = limiter(60.0, 0, 1);
    let start = Instant::now();

    assert!(limiter.acquire(None).await);
    assert_eq!(start.elapsed(), Duration::ZERO);

    assert!(limiter.acquire(None).await);
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn acquire_times_out_without_consuming() {
    let limiter = limiter(0.6, 0, 1); // one token per 100 seconds
    assert!(limiter.acquire(None).await);

    let acquired = limiter.acquire(Some(Duration::from_secs(1))).await;
    assert!(!acquired);
    assert_eq!(limiter.stats().await.daily_count, 1);
}

#[tokio::test(start_paused = true)]
async fn daily_cap_fails_fast_and_resets_after_a_day() {
    let limiter = limiter(6000.0, 2, 10);

    assert!(limiter.acquire(None).await);
    assert!(limiter.acquire(None).await);

    // Cap reached: returns false immediately instead of sleeping.
    let start = Instant::now();
    assert!(!limiter.acquire(None).await);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(limiter.daily_remaining().await, Some(0));

    tokio::time::advance(Duration::from_secs(86_400)).await;
    assert!(limiter.acquire(None).await);
}

#[tokio::test(start_paused = true)]
async fn acquire_or_raise_carries_retry_after() {
    let limiter = limiter(6000.0, 1, 10);
    limiter.acquire_or_raise(None).await.unwrap();

    let err = limiter.acquire_or_raise(None).await.unwrap_err();
    match err {
        GuruFocusError::RateLimited { retry_after, .. } => {
            let secs = retry_after.unwrap();
            assert!(secs > 0 && secs <= 86_400);
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn can_acquire_is_inspect_only() {
    let limiter = limiter(60.0, 0, 2);

    assert!(limiter.can_acquire().await);
    assert!(limiter.can_acquire().await);
    assert_eq!(limiter.stats().await.daily_count, 0);

    assert!(limiter.acquire(None).await);
    assert!(limiter.acquire(None).await);
    assert!(!limiter.can_acquire().await);
}

#[tokio::test(start_paused = true)]
async fn time_until_available_reflects_refill_rate() {
    let limiter = limiter(60.0, 0, 1);
    assert_eq!(limiter.time_until_available().await, Duration::ZERO);

    assert!(limiter.acquire(None).await);
    let wait = limiter.time_until_available().await;
    assert!(wait > Duration::from_millis(900));
    assert!(wait <= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn reset_restores_initial_state() {
    let limiter = limiter(60.0, 100, 3);
    for _ in 0..3 {
        assert!(limiter.acquire(None).await);
    }

    limiter.reset().await;
    let stats = limiter.stats().await;
    assert!((stats.tokens - 3.0).abs() < 1e-9);
    assert_eq!(stats.daily_count, 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_limiter_always_succeeds_without_state_change() {
    let limiter = RateLimiter::disabled();
    let start = Instant::now();

    for _ in 0..100 {
        assert!(limiter.acquire(None).await);
        limiter.acquire_or_raise(None).await.unwrap();
    }

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(limiter.can_acquire().await);
    assert_eq!(limiter.time_until_available().await, Duration::ZERO);
    let stats = limiter.stats().await;
    assert!(!stats.enabled);
    assert_eq!(stats.daily_count, 0);
}
