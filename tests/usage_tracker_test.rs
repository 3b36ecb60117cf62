// ABOUTME: Integration tests for the usage tracker: states, syncs, and persistence
// ABOUTME: Verifies the Unknown/Synced contract and the reserved cache snapshot
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use gurufocus_mcp_server::cache::CacheManager;
use gurufocus_mcp_server::usage_tracker::{UsageTracker, UsageTrackerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const ONE_MIB: u64 = 1024 * 1024;

fn tracker_config() -> UsageTrackerConfig {
    UsageTrackerConfig {
        enabled: true,
        sync_interval: Duration::from_secs(300),
        warn_threshold_percent: 10.0,
        daily_limit: 10_000,
    }
}

#[tokio::test]
async fn unknown_state_has_no_estimate_and_ignores_decrements() {
    let tracker = UsageTracker::new(tracker_config());

    assert_eq!(tracker.remaining().await, None);
    tracker.decrement().await;
    tracker.decrement().await;
    assert_eq!(tracker.remaining().await, None);
    assert_eq!(tracker.stats().await.local_consumed, 0);
}

#[tokio::test]
async fn synced_state_decrements_locally() {
    let tracker = UsageTracker::new(tracker_config());

    tracker.sync(100).await;
    assert_eq!(tracker.remaining().await, Some(100));

    tracker.decrement().await;
    tracker.decrement().await;
    tracker.decrement().await;
    assert_eq!(tracker.remaining().await, Some(97));

    let stats = tracker.stats().await;
    assert_eq!(stats.base_remaining, Some(100));
    assert_eq!(stats.local_consumed, 3);
}

#[tokio::test]
async fn estimate_saturates_at_zero() {
    let tracker = UsageTracker::new(tracker_config());

    tracker.sync(2).await;
    for _ in 0..5 {
        tracker.decrement().await;
    }
    assert_eq!(tracker.remaining().await, Some(0));
}

#[tokio::test]
async fn sync_resets_local_consumption() {
    let tracker = UsageTracker::new(tracker_config());

    tracker.sync(100).await;
    tracker.decrement().await;
    tracker.decrement().await;
    tracker.sync(90).await;

    assert_eq!(tracker.remaining().await, Some(90));
    assert_eq!(tracker.stats().await.local_consumed, 0);
}

#[tokio::test]
async fn should_sync_follows_the_interval() {
    let tracker = UsageTracker::new(tracker_config());

    // Never synced: a sync is due immediately.
    assert!(tracker.should_sync().await);

    tracker.sync(100).await;
    assert!(!tracker.should_sync().await);

    // Zero interval means every check is due.
    let eager = UsageTracker::new(UsageTrackerConfig {
        sync_interval: Duration::ZERO,
        ..tracker_config()
    });
    eager.sync(100).await;
    assert!(eager.should_sync().await);
}

#[tokio::test]
async fn warning_threshold_fires_below_percentage() {
    let tracker = UsageTracker::new(UsageTrackerConfig {
        daily_limit: 1000,
        warn_threshold_percent: 10.0,
        ..tracker_config()
    });

    assert!(!tracker.check_warning_threshold().await);

    tracker.sync(500).await;
    assert!(!tracker.check_warning_threshold().await);

    tracker.sync(99).await;
    assert!(tracker.check_warning_threshold().await);
}

#[tokio::test]
async fn snapshot_round_trips_through_the_cache() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(CacheManager::new(dir.path(), ONE_MIB));

    let tracker = UsageTracker::new(tracker_config());
    tracker.initialize(Arc::clone(&cache)).await;
    tracker.sync(3842).await;
    tracker.decrement().await;
    cache.close().await;

    // A fresh tracker over the same cache directory resumes from the
    // persisted base value; local consumption is not part of the snapshot.
    let cache = Arc::new(CacheManager::new(dir.path(), ONE_MIB));
    let restarted = UsageTracker::new(tracker_config());
    restarted.initialize(Arc::clone(&cache)).await;

    assert_eq!(restarted.remaining().await, Some(3842));
    assert!(!restarted.should_sync().await);
}

#[tokio::test]
async fn disabled_tracker_is_a_null_object() {
    let tracker = UsageTracker::disabled();
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(CacheManager::new(dir.path(), ONE_MIB));

    tracker.initialize(cache).await;
    tracker.sync(100).await;
    tracker.decrement().await;

    assert_eq!(tracker.remaining().await, None);
    assert!(!tracker.should_sync().await);
    assert!(!tracker.check_warning_threshold().await);
    assert!(!tracker.stats().await.enabled);
}
