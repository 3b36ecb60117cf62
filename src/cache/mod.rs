// ABOUTME: Cache abstraction layer for API response caching with TTL and LRU eviction
// ABOUTME: Pluggable backend trait with a persistent disk implementation and category-aware manager
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod disk;
pub mod manager;
pub mod policy;

pub use disk::DiskCacheBackend;
pub use manager::{CacheManager, CacheManagerStats};
pub use policy::{build_cache_key, CacheCategory, CacheTier};

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Cache backend trait for pluggable storage implementations.
///
/// Storage faults never surface to callers: a failed read degrades to an
/// absent result, a failed write is logged and dropped. The backend
/// serializes its internal state mutations; methods may be called from any
/// number of concurrent tasks.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Retrieve a value, refreshing its recency. Absent on miss, expiry, or
    /// storage fault.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value with an absolute expiry of now + `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Duration);

    /// Remove a single entry. Returns whether it existed.
    async fn delete(&self, key: &str) -> bool;

    /// Remove every entry whose full key matches a shell-style glob pattern.
    /// Returns the number of entries removed.
    async fn delete_pattern(&self, pattern: &str) -> u64;

    /// Whether a live (unexpired) entry exists for the key.
    async fn exists(&self, key: &str) -> bool;

    /// Remove all entries.
    async fn clear(&self);

    /// Flush and release storage resources. Idempotent.
    async fn close(&self);

    /// Current backend statistics.
    async fn stats(&self) -> BackendStats;
}

/// Point-in-time statistics for a cache backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStats {
    /// Storage directory, when the backend is disk-based.
    pub directory: Option<PathBuf>,
    /// Resident payload bytes.
    pub size_bytes: u64,
    /// Number of live entries.
    pub item_count: u64,
    /// Configured resident-size ceiling in bytes.
    pub size_limit_bytes: u64,
}
