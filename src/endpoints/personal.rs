// ABOUTME: Personal data endpoints: API usage quota and saved screeners
// ABOUTME: The typed usage fetch doubles as the usage tracker's authoritative sync point
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::cached_get;
use crate::cache::CacheCategory;
use crate::client::GuruFocusClient;
use crate::errors::GuruFocusResult;
use crate::models::ApiUsage;
use serde_json::Value;

/// Endpoints for personal/user data.
pub struct PersonalEndpoint<'a> {
    client: &'a GuruFocusClient,
}

impl<'a> PersonalEndpoint<'a> {
    pub(crate) const fn new(client: &'a GuruFocusClient) -> Self {
        Self { client }
    }

    /// API usage statistics. The authoritative remaining count also syncs
    /// the usage tracker.
    pub async fn get_api_usage(&self, bypass_cache: bool) -> GuruFocusResult<ApiUsage> {
        let data = self.get_api_usage_raw(bypass_cache).await?;
        let usage = ApiUsage::from_api_response(&data)?;
        self.client
            .usage_tracker()
            .sync(usage.api_requests_remaining)
            .await;
        Ok(usage)
    }

    /// Raw API usage response.
    pub async fn get_api_usage_raw(&self, bypass_cache: bool) -> GuruFocusResult<Value> {
        cached_get(
            self.client,
            CacheCategory::ApiUsage,
            &["usage"],
            "api_usage",
            None,
            bypass_cache,
        )
        .await
    }

    /// Local estimate of remaining quota, without an upstream call.
    /// `None` until the tracker has synced at least once.
    pub async fn get_usage_estimate(&self) -> Option<u64> {
        self.client.usage_tracker().remaining().await
    }

    /// Raw list of the user's saved screeners.
    pub async fn get_user_screeners_raw(&self, bypass_cache: bool) -> GuruFocusResult<Value> {
        cached_get(
            self.client,
            CacheCategory::UserScreeners,
            &["screeners"],
            "user_screeners",
            None,
            bypass_cache,
        )
        .await
    }

    /// Raw results page from a saved screener.
    pub async fn get_user_screener_results_raw(
        &self,
        screener_id: u64,
        page: u32,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        let key = format!("{screener_id}:{page}");
        cached_get(
            self.client,
            CacheCategory::UserScreenerResults,
            &[&key],
            &format!("user_screeners/{screener_id}/{page}"),
            None,
            bypass_cache,
        )
        .await
    }
}
