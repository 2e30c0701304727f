//! In-memory response cache with TTL expiry
//!
//! Provides a `ResponseCache` that stores decoded API payloads under a
//! resource key. Expiry is lazy: stale entries are ignored on read and
//! replaced by the next write, never swept in the background.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A single cached payload
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached payload
    data: Value,
    /// Monotonic write instant, used for TTL checks
    stored_at: Instant,
    /// Wall-clock write time
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(data: Value) -> Self {
        Self {
            data,
            stored_at: Instant::now(),
            cached_at: Utc::now(),
        }
    }
}

/// Result of a fresh cache hit
#[derive(Debug, Clone)]
pub struct CachedData {
    /// The cached payload
    pub data: Value,
    /// When the payload was written
    pub cached_at: DateTime<Utc>,
    /// Age of the entry at read time
    pub age: Duration,
}

/// Entries plus the invalidation counters that guard late writes
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Generation at which each key was last invalidated
    invalidated: HashMap<String, u64>,
    /// Generation of the last full clear
    cleared: u64,
    /// Bumped by every invalidation
    counter: u64,
}

impl CacheState {
    fn generation(&self, key: &str) -> u64 {
        let invalidated = self.invalidated.get(key).copied().unwrap_or(0);
        invalidated.max(self.cleared)
    }
}

/// Shared map of resource key to cached payload
///
/// Entries are valid while `now - stored_at < ttl`. Each key also carries a
/// generation that changes whenever the key is invalidated, so a fetch that
/// started before an invalidation can be kept from caching its result.
#[derive(Debug)]
pub struct ResponseCache {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates an empty cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
        }
    }

    /// Returns the TTL applied to every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are plain values, so a panic mid-update cannot leave one half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a fresh entry
    ///
    /// Returns `None` if the key is missing or the entry is older than the TTL.
    pub fn read(&self, key: &str) -> Option<CachedData> {
        let state = self.lock();
        let entry = state.entries.get(key)?;
        let age = entry.stored_at.elapsed();

        if age >= self.ttl {
            debug!("Cache entry for {key} is stale ({}s old)", age.as_secs());
            return None;
        }

        debug!("Using cached data for: {key}");
        Some(CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
            age,
        })
    }

    /// Current generation of `key`; changes whenever the key is invalidated
    pub fn generation(&self, key: &str) -> u64 {
        self.lock().generation(key)
    }

    /// Stores a payload under `key`, replacing any previous entry
    pub fn write(&self, key: &str, data: Value) {
        self.lock().entries.insert(key.to_string(), CacheEntry::new(data));
        debug!("Cached data for: {key}");
    }

    /// Stores a payload only if `key` is still at `generation`
    ///
    /// Returns `false`, leaving the cache untouched, when the key was
    /// invalidated after `generation` was taken.
    pub fn write_if_current(&self, key: &str, data: Value, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation(key) != generation {
            debug!("Skipping cache write for {key}: invalidated during fetch");
            return false;
        }
        state.entries.insert(key.to_string(), CacheEntry::new(data));
        debug!("Cached data for: {key}");
        true
    }

    /// Removes one entry, or every entry when `key` is `None`
    pub fn invalidate(&self, key: Option<&str>) {
        let mut state = self.lock();
        state.counter += 1;
        let generation = state.counter;
        match key {
            Some(key) => {
                state.entries.remove(key);
                state.invalidated.insert(key.to_string(), generation);
                debug!("Cleared cache for: {key}");
            }
            None => {
                state.entries.clear();
                state.invalidated.clear();
                state.cleared = generation;
                debug!("Cleared all cache");
            }
        }
    }

    /// Keys currently held, fresh or stale, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether an entry exists for `key`, regardless of freshness
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }
}
