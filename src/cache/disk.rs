// ABOUTME: Persistent disk cache backend built on sled with TTL, byte cap, and LRU eviction
// ABOUTME: Reads degrade to absent and writes are dropped on storage faults, never failing a request
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{BackendStats, CacheBackend};
use anyhow::{Context, Result};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Stored representation of one cache entry.
///
/// `last_access` is persisted so the LRU order survives a restart.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: Value,
    expires_at_ms: i64,
    last_access_ms: i64,
}

/// In-memory metadata mirrored from the store, ordered by recency.
#[derive(Debug, Clone, Copy)]
struct EntryMeta {
    expires_at_ms: i64,
    size_bytes: u64,
}

struct DiskState {
    db: sled::Db,
    /// Recency index over every live key. Unbounded by entry count; the
    /// byte cap is enforced explicitly on insert.
    index: LruCache<String, EntryMeta>,
    total_bytes: u64,
}

/// Persistent key-value cache with TTL expiry and least-recently-used
/// eviction under a resident-size cap.
///
/// sled operations are synchronous and typically sub-millisecond; every
/// method yields back to the scheduler after touching the store so long
/// batches of cache calls do not starve other tasks.
pub struct DiskCacheBackend {
    directory: PathBuf,
    size_limit_bytes: u64,
    state: RwLock<Option<DiskState>>,
}

impl DiskCacheBackend {
    /// Open (or create) the cache at `directory` with the given byte cap.
    ///
    /// Existing entries are reloaded with their persisted recency order;
    /// entries that expired while the process was down are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the store
    /// cannot be opened.
    pub fn open(directory: impl AsRef<Path>, size_limit_bytes: u64) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("creating cache directory {}", directory.display()))?;

        let db = sled::Config::new()
            .path(&directory)
            .open()
            .with_context(|| format!("opening cache store at {}", directory.display()))?;

        let (index, total_bytes) = Self::rebuild_index(&db);
        debug!(
            directory = %directory.display(),
            entries = index.len(),
            total_bytes,
            "disk cache opened"
        );

        Ok(Self {
            directory,
            size_limit_bytes,
            state: RwLock::new(Some(DiskState {
                db,
                index,
                total_bytes,
            })),
        })
    }

    /// Scan the store, dropping expired entries and rebuilding the recency
    /// index from persisted access times (oldest first).
    fn rebuild_index(db: &sled::Db) -> (LruCache<String, EntryMeta>, u64) {
        let now = now_ms();
        let mut live: Vec<(String, EntryMeta, i64)> = Vec::new();
        let mut expired: Vec<sled::IVec> = Vec::new();

        for item in db.iter() {
            let Ok((key_bytes, value_bytes)) = item else {
                continue;
            };
            let Ok(key) = String::from_utf8(key_bytes.to_vec()) else {
                expired.push(key_bytes);
                continue;
            };
            match serde_json::from_slice::<StoredEntry>(&value_bytes) {
                Ok(entry) if entry.expires_at_ms > now => {
                    let meta = EntryMeta {
                        expires_at_ms: entry.expires_at_ms,
                        size_bytes: entry_size(&key, value_bytes.len()),
                    };
                    live.push((key, meta, entry.last_access_ms));
                }
                _ => expired.push(key_bytes),
            }
        }

        for key in expired {
            let _ = db.remove(key);
        }

        live.sort_by_key(|(_, _, last_access)| *last_access);

        let mut index = LruCache::unbounded();
        let mut total_bytes = 0_u64;
        for (key, meta, _) in live {
            total_bytes += meta.size_bytes;
            index.push(key, meta);
        }
        (index, total_bytes)
    }

    /// Remove one key from the index and the store, adjusting totals.
    fn purge(state: &mut DiskState, key: &str) -> bool {
        let existed = state.index.pop(key).map(|meta| {
            state.total_bytes = state.total_bytes.saturating_sub(meta.size_bytes);
        });
        if let Err(e) = state.db.remove(key) {
            warn!(key, error = %e, "cache remove error");
        }
        existed.is_some()
    }

    /// Evict least-recently-used entries until the byte cap is respected.
    fn evict_to_cap(state: &mut DiskState, cap: u64) {
        while state.total_bytes > cap {
            let Some((key, meta)) = state.index.pop_lru() else {
                break;
            };
            state.total_bytes = state.total_bytes.saturating_sub(meta.size_bytes);
            if let Err(e) = state.db.remove(&key) {
                warn!(key, error = %e, "cache eviction remove error");
            }
            debug!(key, "cache entry evicted");
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for DiskCacheBackend {
    async fn get(&self, key: &str) -> Option<Value> {
        let result = {
            let mut guard = self.state.write().await;
            let Some(state) = guard.as_mut() else {
                return None;
            };

            match state.index.get(key).copied() {
                None => None,
                Some(meta) if meta.expires_at_ms <= now_ms() => {
                    Self::purge(state, key);
                    None
                }
                Some(_) => match state.db.get(key) {
                    Ok(Some(bytes)) => match serde_json::from_slice::<StoredEntry>(&bytes) {
                        Ok(mut entry) => {
                            // Persist the new access time so LRU order
                            // survives a restart.
                            entry.last_access_ms = now_ms();
                            if let Ok(updated) = serde_json::to_vec(&entry) {
                                if let Err(e) = state.db.insert(key, updated) {
                                    warn!(key, error = %e, "cache access-time update error");
                                }
                            }
                            Some(entry.value)
                        }
                        Err(e) => {
                            warn!(key, error = %e, "cache entry decode error");
                            Self::purge(state, key);
                            None
                        }
                    },
                    Ok(None) => {
                        // Index and store disagree; drop the stale index entry.
                        Self::purge(state, key);
                        None
                    }
                    Err(e) => {
                        warn!(key, error = %e, "cache get error");
                        None
                    }
                },
            }
        };
        tokio::task::yield_now().await;
        result
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) {
        {
            let mut guard = self.state.write().await;
            let Some(state) = guard.as_mut() else {
                return;
            };

            let now = now_ms();
            let entry = StoredEntry {
                value: value.clone(),
                expires_at_ms: now + ttl.as_millis() as i64,
                last_access_ms: now,
            };
            let Ok(bytes) = serde_json::to_vec(&entry) else {
                warn!(key, "cache entry encode error");
                return;
            };
            let size = entry_size(key, bytes.len());
            if size > self.size_limit_bytes {
                debug!(key, size, "cache entry larger than size cap, not stored");
                return;
            }

            if let Err(e) = state.db.insert(key, bytes) {
                warn!(key, error = %e, "cache set error");
                return;
            }

            if let Some(previous) = state.index.push(key.to_owned(), EntryMeta {
                expires_at_ms: entry.expires_at_ms,
                size_bytes: size,
            }) {
                // push returns the displaced pair when the key already existed
                if previous.0 == key {
                    state.total_bytes = state.total_bytes.saturating_sub(previous.1.size_bytes);
                }
            }
            state.total_bytes += size;

            Self::evict_to_cap(state, self.size_limit_bytes);
        }
        tokio::task::yield_now().await;
    }

    async fn delete(&self, key: &str) -> bool {
        let existed = {
            let mut guard = self.state.write().await;
            guard.as_mut().is_some_and(|state| Self::purge(state, key))
        };
        tokio::task::yield_now().await;
        existed
    }

    async fn delete_pattern(&self, pattern: &str) -> u64 {
        let deleted = {
            let mut guard = self.state.write().await;
            let Some(state) = guard.as_mut() else {
                return 0;
            };

            let glob_pattern = match glob::Pattern::new(pattern) {
                Ok(p) => p,
                Err(e) => {
                    warn!(pattern, error = %e, "invalid cache glob pattern");
                    return 0;
                }
            };

            let matches: Vec<String> = state
                .index
                .iter()
                .filter(|(key, _)| glob_pattern.matches(key))
                .map(|(key, _)| key.clone())
                .collect();

            let mut deleted = 0_u64;
            for key in &matches {
                if Self::purge(state, key) {
                    deleted += 1;
                }
            }
            if deleted > 0 {
                debug!(pattern, deleted, "cache pattern delete");
            }
            deleted
        };
        tokio::task::yield_now().await;
        deleted
    }

    async fn exists(&self, key: &str) -> bool {
        let exists = {
            let mut guard = self.state.write().await;
            let Some(state) = guard.as_mut() else {
                return false;
            };
            match state.index.peek(key).copied() {
                None => false,
                Some(meta) if meta.expires_at_ms <= now_ms() => {
                    Self::purge(state, key);
                    false
                }
                Some(_) => true,
            }
        };
        tokio::task::yield_now().await;
        exists
    }

    async fn clear(&self) {
        {
            let mut guard = self.state.write().await;
            if let Some(state) = guard.as_mut() {
                if let Err(e) = state.db.clear() {
                    warn!(error = %e, "cache clear error");
                }
                state.index.clear();
                state.total_bytes = 0;
            }
        }
        tokio::task::yield_now().await;
    }

    async fn close(&self) {
        {
            let mut guard = self.state.write().await;
            if let Some(state) = guard.take() {
                if let Err(e) = state.db.flush() {
                    warn!(error = %e, "cache flush error on close");
                }
                debug!("disk cache closed");
            }
        }
        tokio::task::yield_now().await;
    }

    async fn stats(&self) -> BackendStats {
        let guard = self.state.read().await;
        let (size_bytes, item_count) = guard
            .as_ref()
            .map_or((0, 0), |state| (state.total_bytes, state.index.len() as u64));
        BackendStats {
            directory: Some(self.directory.clone()),
            size_bytes,
            item_count,
            size_limit_bytes: self.size_limit_bytes,
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn entry_size(key: &str, value_len: usize) -> u64 {
    (key.len() + value_len) as u64
}
