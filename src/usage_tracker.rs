// ABOUTME: Local estimate of remaining upstream API quota with periodic authoritative sync
// ABOUTME: Decrements after each successful response and persists snapshots for restart recovery
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::{CacheCategory, CacheManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Reserved cache key part for the persisted tracker snapshot.
const TRACKER_STATE_KEY: &str = "tracker_state";

/// Configuration for usage tracking.
#[derive(Debug, Clone)]
pub struct UsageTrackerConfig {
    /// Whether tracking is enabled.
    pub enabled: bool,
    /// Seconds between authoritative syncs before `should_sync` fires.
    pub sync_interval: Duration,
    /// Warn when the remaining estimate drops below this percentage of the
    /// daily limit.
    pub warn_threshold_percent: f64,
    /// Expected daily quota, the base for the warning threshold.
    pub daily_limit: u64,
}

impl Default for UsageTrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_interval: Duration::from_secs(300),
            warn_threshold_percent: 10.0,
            daily_limit: 10_000,
        }
    }
}

/// Persisted snapshot, stored under the reserved `api_usage:tracker_state`
/// cache key so estimates survive restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UsageSnapshot {
    remaining: u64,
    synced_at: i64,
}

#[derive(Default)]
struct TrackerState {
    /// Authoritative remaining count at the last sync. `None` until the
    /// first sync (state Unknown).
    base_remaining: Option<u64>,
    /// Requests consumed locally since the last sync.
    local_consumed: u64,
    /// Unix seconds of the last sync, `None` if never synced.
    last_sync: Option<i64>,
    cache: Option<Arc<CacheManager>>,
}

impl TrackerState {
    fn estimate(&self) -> Option<u64> {
        self.base_remaining
            .map(|base| base.saturating_sub(self.local_consumed))
    }
}

/// Smart API usage tracker with local decrement and periodic sync.
///
/// Maintains an estimate of remaining upstream quota without probe calls:
/// it starts from the last persisted snapshot, decrements locally after each
/// successful request, and resets whenever an authoritative reading arrives
/// from the `api_usage` endpoint.
pub struct UsageTracker {
    config: UsageTrackerConfig,
    state: Mutex<TrackerState>,
}

impl UsageTracker {
    /// Create a tracker with the given configuration.
    #[must_use]
    pub fn new(config: UsageTrackerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Null variant for disabled tracking: every operation is a no-op and
    /// the estimate stays undefined.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(UsageTrackerConfig {
            enabled: false,
            ..UsageTrackerConfig::default()
        })
    }

    /// Whether tracking is enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Load the persisted snapshot from the cache, entering the Synced state
    /// if one is present. No upstream call is made.
    pub async fn initialize(&self, cache: Arc<CacheManager>) {
        if !self.config.enabled {
            debug!("usage tracker disabled");
            return;
        }

        let snapshot = cache
            .get(CacheCategory::ApiUsage, &[TRACKER_STATE_KEY], false)
            .await
            .and_then(|value| serde_json::from_value::<UsageSnapshot>(value).ok());

        let mut state = self.state.lock().await;
        state.cache = Some(cache);
        match snapshot {
            Some(snapshot) => {
                state.base_remaining = Some(snapshot.remaining);
                state.last_sync = Some(snapshot.synced_at);
                debug!(
                    remaining = snapshot.remaining,
                    synced_at = snapshot.synced_at,
                    "usage tracker initialized from cache"
                );
            }
            None => debug!("usage tracker has no cached state"),
        }
    }

    /// Record one successful API call against the local estimate.
    ///
    /// A no-op before the first sync: with no base reading there is nothing
    /// to decrement from.
    pub async fn decrement(&self) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        if state.base_remaining.is_some() {
            state.local_consumed += 1;
            debug!(local_consumed = state.local_consumed, "usage tracker decrement");
        }
    }

    /// Estimated remaining API calls, or `None` if never synced.
    pub async fn remaining(&self) -> Option<u64> {
        if !self.config.enabled {
            return None;
        }
        self.state.lock().await.estimate()
    }

    /// Whether the sync interval has elapsed since the last sync.
    pub async fn should_sync(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let state = self.state.lock().await;
        state.last_sync.is_none_or(|last| {
            chrono::Utc::now().timestamp() - last >= self.config.sync_interval.as_secs() as i64
        })
    }

    /// Reset the estimate from an authoritative remaining count and persist
    /// the snapshot for restart recovery.
    pub async fn sync(&self, authoritative_remaining: u64) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        let previous_estimate = state.estimate();
        let now = chrono::Utc::now().timestamp();

        state.base_remaining = Some(authoritative_remaining);
        state.local_consumed = 0;
        state.last_sync = Some(now);

        info!(
            api_remaining = authoritative_remaining,
            previous_estimate,
            drift = previous_estimate.map(|p| p.abs_diff(authoritative_remaining)),
            "usage tracker synced"
        );

        if let Some(cache) = state.cache.clone() {
            let snapshot = UsageSnapshot {
                remaining: authoritative_remaining,
                synced_at: now,
            };
            match serde_json::to_value(&snapshot) {
                Ok(value) => {
                    cache
                        .set(CacheCategory::ApiUsage, &[TRACKER_STATE_KEY], &value, None)
                        .await;
                }
                Err(e) => warn!(error = %e, "usage tracker snapshot encode error"),
            }
        }
    }

    /// Whether the remaining estimate is below the warning threshold.
    pub async fn check_warning_threshold(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let Some(remaining) = self.remaining().await else {
            return false;
        };
        let threshold =
            self.config.daily_limit as f64 * self.config.warn_threshold_percent / 100.0;
        (remaining as f64) < threshold
    }

    /// Current tracker statistics.
    pub async fn stats(&self) -> UsageTrackerStats {
        let state = self.state.lock().await;
        UsageTrackerStats {
            enabled: self.config.enabled,
            remaining_estimate: state.estimate(),
            base_remaining: state.base_remaining,
            local_consumed: state.local_consumed,
            last_sync: state.last_sync,
            sync_interval_seconds: self.config.sync_interval.as_secs(),
            warn_threshold_percent: self.config.warn_threshold_percent,
            daily_limit: self.config.daily_limit,
        }
    }
}

/// Point-in-time tracker statistics.
#[derive(Debug, Clone, Serialize)]
pub struct UsageTrackerStats {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_estimate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_remaining: Option<u64>,
    pub local_consumed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<i64>,
    pub sync_interval_seconds: u64,
    pub warn_threshold_percent: f64,
    pub daily_limit: u64,
}
