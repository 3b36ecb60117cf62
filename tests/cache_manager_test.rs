// ABOUTME: Integration tests for the category-aware cache manager
// ABOUTME: Hit/miss accounting, bypass semantics, invalidation patterns, and disabled mode
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use gurufocus_mcp_server::cache::{CacheCategory, CacheManager};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const ONE_MIB: u64 = 1024 * 1024;

fn manager(dir: &TempDir) -> CacheManager {
    CacheManager::new(dir.path(), ONE_MIB)
}

#[tokio::test]
async fn hits_plus_misses_equals_operations() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    assert!(cache.get(CacheCategory::Summary, &["AAPL"], false).await.is_none());
    cache
        .set(CacheCategory::Summary, &["AAPL"], &json!({"gf_score": 95}), None)
        .await;
    assert!(cache.get(CacheCategory::Summary, &["AAPL"], false).await.is_some());
    assert!(cache.get(CacheCategory::Summary, &["MSFT"], false).await.is_none());

    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits() + cache.misses(), 3);
}

#[tokio::test]
async fn bypass_skips_the_backend_and_counts_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Summary, &["AAPL"], &json!(1), None).await;
    assert!(cache.get(CacheCategory::Summary, &["AAPL"], true).await.is_none());
    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.misses(), 1);

    // The stored entry is untouched by the bypass.
    assert!(cache.get(CacheCategory::Summary, &["AAPL"], false).await.is_some());
}

#[tokio::test]
async fn ttl_override_replaces_category_policy() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache
        .set(
            CacheCategory::Financials,
            &["AAPL", "annual"],
            &json!(1),
            Some(Duration::from_millis(40)),
        )
        .await;
    assert!(cache
        .get(CacheCategory::Financials, &["AAPL", "annual"], false)
        .await
        .is_some());

    tokio::time::sleep(Duration::from_millis(70)).await;
    assert!(cache
        .get(CacheCategory::Financials, &["AAPL", "annual"], false)
        .await
        .is_none());
}

#[tokio::test]
async fn invalidate_symbol_upper_cases_and_spans_categories() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Summary, &["AAPL"], &json!(1), None).await;
    cache
        .set(CacheCategory::Financials, &["AAPL", "annual"], &json!(2), None)
        .await;
    cache.set(CacheCategory::Summary, &["MSFT"], &json!(3), None).await;

    assert_eq!(cache.invalidate_symbol(" aapl ").await, 2);
    assert!(cache.get(CacheCategory::Summary, &["MSFT"], false).await.is_some());
}

#[tokio::test]
async fn invalidate_category_leaves_other_categories() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Summary, &["AAPL"], &json!(1), None).await;
    cache.set(CacheCategory::Summary, &["MSFT"], &json!(2), None).await;
    cache.set(CacheCategory::Quote, &["AAPL"], &json!(3), None).await;

    assert_eq!(cache.invalidate_category(CacheCategory::Summary).await, 2);
    assert!(cache.get(CacheCategory::Quote, &["AAPL"], false).await.is_some());
}

#[tokio::test]
async fn invalidate_earnings_targets_flagged_categories_only() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Financials, &["AAPL", "annual"], &json!(1), None).await;
    cache.set(CacheCategory::Summary, &["AAPL"], &json!(2), None).await;
    cache.set(CacheCategory::Quote, &["AAPL"], &json!(3), None).await;

    assert_eq!(cache.invalidate_earnings("AAPL").await, 2);
    // Price data is not earnings-sensitive.
    assert!(cache.get(CacheCategory::Quote, &["AAPL"], false).await.is_some());
}

#[tokio::test]
async fn clear_resets_counters_and_entries() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Summary, &["AAPL"], &json!(1), None).await;
    let _ = cache.get(CacheCategory::Summary, &["AAPL"], false).await;
    cache.clear().await;

    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.misses(), 0);
    assert!(cache.get(CacheCategory::Summary, &["AAPL"], false).await.is_none());
}

#[tokio::test]
async fn disabled_manager_is_a_null_object() {
    let cache = CacheManager::disabled();

    cache.set(CacheCategory::Summary, &["AAPL"], &json!(1), None).await;
    assert!(cache.get(CacheCategory::Summary, &["AAPL"], false).await.is_none());
    assert!(!cache.delete(CacheCategory::Summary, &["AAPL"]).await);
    assert_eq!(cache.invalidate_symbol("AAPL").await, 0);
    assert_eq!(cache.invalidate_category(CacheCategory::Summary).await, 0);

    let stats = cache.stats().await;
    assert!(!stats.enabled);
    assert_eq!(stats.misses, 1);
    assert!(stats.backend.is_none());
}

#[tokio::test]
async fn stats_carry_backend_numbers_when_enabled() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir);

    cache.set(CacheCategory::Summary, &["AAPL"], &json!({"a": 1}), None).await;
    let _ = cache.get(CacheCategory::Summary, &["AAPL"], false).await;
    let _ = cache.get(CacheCategory::Summary, &["MSFT"], false).await;

    let stats = cache.stats().await;
    assert!(stats.enabled);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    let backend = stats.backend.unwrap();
    assert_eq!(backend.item_count, 1);
    assert!(backend.size_bytes > 0);
}
