// ABOUTME: Integration tests for the persistent disk cache backend
// ABOUTME: Covers TTL expiry, pattern deletes, LRU eviction under the byte cap, and reopen
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use gurufocus_mcp_server::cache::{CacheBackend, DiskCacheBackend};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const ONE_MIB: u64 = 1024 * 1024;

fn open(dir: &TempDir, cap: u64) -> DiskCacheBackend {
    DiskCacheBackend::open(dir.path(), cap).unwrap()
}

#[tokio::test]
async fn set_then_get_round_trips_within_ttl() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    let value = json!({"price": 255.5, "symbol": "AAPL"});
    cache.set("summary:AAPL", &value, Duration::from_secs(60)).await;

    assert_eq!(cache.get("summary:AAPL").await, Some(value));
    assert!(cache.exists("summary:AAPL").await);
    assert!(!cache.exists("summary:MSFT").await);
}

#[tokio::test]
async fn expired_entries_never_satisfy_reads() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("quote:AAPL", &json!(1), Duration::from_millis(50)).await;
    assert!(cache.exists("quote:AAPL").await);

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(cache.get("quote:AAPL").await, None);
    assert!(!cache.exists("quote:AAPL").await);
}

#[tokio::test]
async fn delete_reports_prior_existence() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("summary:AAPL", &json!(1), Duration::from_secs(60)).await;
    assert!(cache.delete("summary:AAPL").await);
    assert!(!cache.delete("summary:AAPL").await);
}

#[tokio::test]
async fn pattern_delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("summary:AAPL", &json!(1), Duration::from_secs(60)).await;
    cache.set("summary:MSFT", &json!(2), Duration::from_secs(60)).await;
    cache.set("financials:AAPL:annual", &json!(3), Duration::from_secs(60)).await;

    assert_eq!(cache.delete_pattern("summary:*").await, 2);
    assert_eq!(cache.delete_pattern("summary:*").await, 0);
    assert!(cache.exists("financials:AAPL:annual").await);
}

#[tokio::test]
async fn symbol_pattern_spans_categories() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("summary:AAPL", &json!(1), Duration::from_secs(60)).await;
    cache.set("financials:AAPL:annual", &json!(2), Duration::from_secs(60)).await;
    cache.set("summary:MSFT", &json!(3), Duration::from_secs(60)).await;

    assert_eq!(cache.delete_pattern("*:AAPL*").await, 2);
    assert!(cache.exists("summary:MSFT").await);
}

#[tokio::test]
async fn byte_cap_evicts_least_recently_used() {
    let dir = TempDir::new().unwrap();
    // Each entry is roughly 375 bytes serialized; the cap holds two.
    let cache = open(&dir, 1000);
    let payload = "x".repeat(300);

    cache.set("a", &json!(payload), Duration::from_secs(60)).await;
    cache.set("b", &json!(payload), Duration::from_secs(60)).await;

    // Touch "a" so "b" becomes least recently used.
    assert!(cache.get("a").await.is_some());

    cache.set("c", &json!(payload), Duration::from_secs(60)).await;

    assert!(cache.exists("a").await);
    assert!(!cache.exists("b").await);
    assert!(cache.exists("c").await);

    let stats = cache.stats().await;
    assert!(stats.size_bytes <= 1000);
    assert_eq!(stats.item_count, 2);
}

#[tokio::test]
async fn oversized_entries_are_not_stored() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, 100);

    cache.set("big", &json!("y".repeat(500)), Duration::from_secs(60)).await;
    assert!(!cache.exists("big").await);
    assert_eq!(cache.stats().await.item_count, 0);
}

#[tokio::test]
async fn entries_survive_close_and_reopen() {
    let dir = TempDir::new().unwrap();
    let value = json!({"survives": true});

    {
        let cache = open(&dir, ONE_MIB);
        cache.set("summary:AAPL", &value, Duration::from_secs(600)).await;
        cache.set("quote:AAPL", &json!(1), Duration::from_millis(10)).await;
        cache.close().await;
    }

    tokio::time::sleep(Duration::from_millis(30)).await;

    let reopened = open(&dir, ONE_MIB);
    assert_eq!(reopened.get("summary:AAPL").await, Some(value));
    // Entries that expired while closed are dropped on reopen.
    assert!(!reopened.exists("quote:AAPL").await);
}

#[tokio::test]
async fn close_is_idempotent_and_reads_degrade() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("summary:AAPL", &json!(1), Duration::from_secs(60)).await;
    cache.close().await;
    cache.close().await;

    assert_eq!(cache.get("summary:AAPL").await, None);
    assert_eq!(cache.delete_pattern("*").await, 0);
}

#[tokio::test]
async fn clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    cache.set("summary:AAPL", &json!(1), Duration::from_secs(60)).await;
    cache.set("quote:AAPL", &json!(2), Duration::from_secs(60)).await;
    cache.clear().await;

    assert_eq!(cache.stats().await.item_count, 0);
    assert_eq!(cache.stats().await.size_bytes, 0);
    assert!(!cache.exists("summary:AAPL").await);
}

#[tokio::test]
async fn stats_reports_directory_and_cap() {
    let dir = TempDir::new().unwrap();
    let cache = open(&dir, ONE_MIB);

    let stats = cache.stats().await;
    assert_eq!(stats.directory.as_deref(), Some(dir.path()));
    assert_eq!(stats.size_limit_bytes, ONE_MIB);
}
