// ABOUTME: Integration tests for the endpoint layer: normalization, fingerprints, params
// ABOUTME: Verifies raw/typed parity and per-page cache keys against a scripted transport
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use common::{test_client, FakeTransport};
use gurufocus_mcp_server::cache::CacheCategory;
use gurufocus_mcp_server::endpoints::insiders::{InsiderSignal, UpdatesFilter};
use gurufocus_mcp_server::endpoints::stocks::PeriodType;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(start_paused = true)]
async fn symbols_are_trimmed_and_upper_cased() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(200, &json!({"summary": {}}));
    let client = test_client(&dir, Arc::clone(&transport));

    client.stocks().get_summary_raw("  aapl  ", false).await.unwrap();

    let call = &transport.calls()[0];
    assert!(call.url.ends_with("/stock/AAPL/summary"));

    // The normalized symbol also keys the cache entry.
    assert!(client
        .cache()
        .await
        .get(CacheCategory::Summary, &["AAPL"], false)
        .await
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn financials_fingerprint_carries_period_type() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(200, &json!({"financials": {"annuals": {"Fiscal Year": []}}}));
    transport.push_json(200, &json!({"financials": {"quarterly": {"Fiscal Year": []}}}));
    let client = test_client(&dir, Arc::clone(&transport));

    client
        .stocks()
        .get_financials_raw("AAPL", PeriodType::Annual, false)
        .await
        .unwrap();
    client
        .stocks()
        .get_financials_raw("AAPL", PeriodType::Quarterly, false)
        .await
        .unwrap();

    // Different fingerprints mean both fetches hit the network.
    assert_eq!(transport.call_count(), 2);

    let calls = transport.calls();
    assert!(calls[0].query.is_empty());
    assert_eq!(
        calls[1].query,
        vec![("type".to_owned(), "quarterly".to_owned())]
    );

    let cache = client.cache().await;
    assert!(cache
        .get(CacheCategory::Financials, &["AAPL", "annual"], false)
        .await
        .is_some());
    assert!(cache
        .get(CacheCategory::Financials, &["AAPL", "quarterly"], false)
        .await
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn typed_variant_parses_the_same_raw_payload() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(
        200,
        &json!({"summary": {"general": {"company": "Apple Inc", "gf_score": 95}}}),
    );
    let client = test_client(&dir, Arc::clone(&transport));

    let summary = client.stocks().get_summary("aapl", false).await.unwrap();
    assert_eq!(summary.symbol, "AAPL");
    assert_eq!(summary.general.company_name.as_deref(), Some("Apple Inc"));
    assert_eq!(summary.quality.gf_score, Some(95));

    // The typed call populated the cache; a raw read needs no network.
    let raw = client.stocks().get_summary_raw("AAPL", false).await.unwrap();
    assert_eq!(raw["summary"]["general"]["company"], json!("Apple Inc"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn insider_updates_cache_by_page_and_filters() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(200, &json!({"data": [], "current_page": 1, "last_page": 1}));
    transport.push_json(200, &json!({"data": [], "current_page": 2, "last_page": 2}));
    let client = test_client(&dir, Arc::clone(&transport));

    let filter = UpdatesFilter::default();
    client.insiders().get_updates_raw(1, &filter, false).await.unwrap();
    client.insiders().get_updates_raw(2, &filter, false).await.unwrap();
    // Page 1 again: served from cache.
    client.insiders().get_updates_raw(1, &filter, false).await.unwrap();

    assert_eq!(transport.call_count(), 2);
    let calls = transport.calls();
    assert_eq!(calls[0].query, vec![("page".to_owned(), "1".to_owned())]);
    assert_eq!(calls[1].query, vec![("page".to_owned(), "2".to_owned())]);
}

#[tokio::test(start_paused = true)]
async fn insider_signals_pass_within_days() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(200, &json!({"data": [], "current_page": 1, "last_page": 1}));
    let client = test_client(&dir, Arc::clone(&transport));

    client
        .insiders()
        .get_signal_raw(InsiderSignal::CeoBuys, 1, Some(30), false)
        .await
        .unwrap();

    let call = &transport.calls()[0];
    assert!(call.url.ends_with("/insider_buys/insider_ceo"));
    assert!(call
        .query
        .contains(&("within_days".to_owned(), "30".to_owned())));
}

#[tokio::test(start_paused = true)]
async fn api_usage_fetch_syncs_the_tracker() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new();
    transport.push_json(200, &json!({"api_usage": 158, "api_requests_remaining": 3842}));
    let client = test_client(&dir, Arc::clone(&transport));

    assert_eq!(client.personal().get_usage_estimate().await, None);

    let usage = client.personal().get_api_usage(false).await.unwrap();
    assert_eq!(usage.api_requests_remaining, 3842);
    assert_eq!(client.personal().get_usage_estimate().await, Some(3842));
}
