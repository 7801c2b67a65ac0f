// Cache service over an injected storage backend and clock.
// Handles entry encoding, TTL checking, and tolerant reads and writes.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::clock::Clock;
use super::store::CacheStorage;

/// Freshness window for cached API responses: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Wrapper for cached data with its capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, in epoch milliseconds.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// Whether the entry is younger than `ttl` at `now_ms`.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) < ttl_ms
    }
}

/// Cache-aside storage shared by all accessors.
#[derive(Clone)]
pub struct CacheService {
    storage: Arc<dyn CacheStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CacheService {
    pub fn new(storage: Arc<dyn CacheStorage>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            storage,
            clock,
            ttl,
        }
    }

    /// Fresh payload under `key`.
    /// Absent, stale, unreadable and malformed entries all read as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(key, error = %e, "ignoring malformed cache entry");
                return None;
            }
        };

        let now_ms = self.clock.now().timestamp_millis();
        if entry.is_fresh(now_ms, self.ttl) {
            Some(entry.data)
        } else {
            tracing::debug!(key, age_ms = now_ms - entry.timestamp, "cache entry stale");
            None
        }
    }

    /// Store `data` under `key` stamped with the current time.
    /// Failures are logged and otherwise ignored.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry::new(data, self.clock.now().timestamp_millis());
        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.storage.set(key, &encoded) {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }
}
