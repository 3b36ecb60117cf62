// ABOUTME: Category-aware cache manager with hit/miss accounting and bypass support
// ABOUTME: Builds keys from category slugs and key parts, applies per-category TTL policy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::policy::{build_cache_key, CacheCategory};
use super::{BackendStats, CacheBackend, DiskCacheBackend};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// High-level cache manager for API responses.
///
/// Wraps a [`CacheBackend`] with category-aware TTLs, hit/miss statistics,
/// a bypass switch, and symbol/category invalidation. A disabled manager
/// (no backend) treats every read as a miss and every write as a no-op.
pub struct CacheManager {
    backend: Option<Arc<dyn CacheBackend>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheManager {
    /// Create a manager backed by the persistent disk cache.
    ///
    /// A backend that fails to open is logged and dropped: the manager then
    /// runs disabled rather than failing client construction, matching the
    /// non-fatal storage-fault contract of the backend itself.
    #[must_use]
    pub fn new(cache_dir: impl AsRef<Path>, size_limit_bytes: u64) -> Self {
        match DiskCacheBackend::open(cache_dir.as_ref(), size_limit_bytes) {
            Ok(backend) => Self::with_backend(Arc::new(backend)),
            Err(e) => {
                warn!(
                    directory = %cache_dir.as_ref().display(),
                    error = %e,
                    "cache backend failed to open, caching disabled"
                );
                Self::disabled()
            }
        }
    }

    /// Create a manager over a custom backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Null variant for disabled-cache mode: absent reads, no-op writes.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            backend: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Whether caching is active.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Number of cache hits since creation (or the last reset).
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of cache misses since creation (or the last reset).
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Read a value. Disabled or bypassed lookups count as misses.
    pub async fn get(
        &self,
        category: CacheCategory,
        key_parts: &[&str],
        bypass: bool,
    ) -> Option<Value> {
        let Some(backend) = self.backend.as_ref().filter(|_| !bypass) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let key = build_cache_key(category, key_parts);
        match backend.get(&key).await {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache hit");
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache miss");
                None
            }
        }
    }

    /// Store a value under the category TTL (or an explicit override).
    pub async fn set(
        &self,
        category: CacheCategory,
        key_parts: &[&str],
        value: &Value,
        ttl_override: Option<Duration>,
    ) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let key = build_cache_key(category, key_parts);
        let ttl = ttl_override.unwrap_or_else(|| category.ttl());
        backend.set(&key, value, ttl).await;
        debug!(key, ttl_seconds = ttl.as_secs(), "cache set");
    }

    /// Delete one entry. Returns whether it existed.
    pub async fn delete(&self, category: CacheCategory, key_parts: &[&str]) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        backend.delete(&build_cache_key(category, key_parts)).await
    }

    /// Invalidate every cached entry for a symbol, across all categories.
    /// Returns the number of entries removed.
    pub async fn invalidate_symbol(&self, symbol: &str) -> u64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };

        let symbol = symbol.trim().to_uppercase();
        let count = backend.delete_pattern(&format!("*:{symbol}*")).await;
        info!(symbol, count, "invalidated cached entries for symbol");
        count
    }

    /// Invalidate every cached entry in a category.
    pub async fn invalidate_category(&self, category: CacheCategory) -> u64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };

        let count = backend
            .delete_pattern(&format!("{}:*", category.as_str()))
            .await;
        info!(category = %category, count, "invalidated cached category");
        count
    }

    /// Invalidate a symbol's entries in every earnings-sensitive category.
    ///
    /// For callers that learn about an earnings event out of band and want
    /// fresh fundamentals without discarding price or static data.
    pub async fn invalidate_earnings(&self, symbol: &str) -> u64 {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };

        let symbol = symbol.trim().to_uppercase();
        let mut count = 0;
        for category in CacheCategory::ALL {
            if category.invalidate_on_earnings() {
                count += backend
                    .delete_pattern(&format!("{}:{symbol}*", category.as_str()))
                    .await;
            }
        }
        info!(symbol, count, "invalidated earnings-sensitive entries");
        count
    }

    /// Clear the backend and reset hit/miss counters.
    pub async fn clear(&self) {
        if let Some(backend) = self.backend.as_ref() {
            backend.clear().await;
        }
        self.reset_stats();
        info!("cache cleared");
    }

    /// Reset hit/miss counters without touching stored entries.
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Close the underlying backend. Idempotent.
    pub async fn close(&self) {
        if let Some(backend) = self.backend.as_ref() {
            backend.close().await;
        }
    }

    /// Manager statistics, including backend storage numbers when enabled.
    pub async fn stats(&self) -> CacheManagerStats {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        let backend = match self.backend.as_ref() {
            Some(backend) => Some(backend.stats().await),
            None => None,
        };

        CacheManagerStats {
            enabled: self.enabled(),
            hits,
            misses,
            hit_rate,
            backend,
        }
    }
}

/// Point-in-time cache manager statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheManagerStats {
    pub enabled: bool,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendStats>,
}
