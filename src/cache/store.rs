//! Persistent Cache Module
//!
//! TTL-expiring, compressed key/value cache over an injected [`StoragePort`].
//! Every failure degrades to a miss: corrupt and expired entries are deleted
//! on sight, and a quota failure on write evicts the oldest quarter of the
//! entries and drops the write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::codec;
use crate::cache::entry::{CacheConfig, CacheEntry, CacheMetadata, EntryHeader};
use crate::cache::stats::CacheStats;
use crate::cache::storage::StoragePort;
use crate::error::StorageError;

// == Public Constants ==
/// Prefix applied to every key the cache writes
pub const NAMESPACE: &str = "kwgap_cache_";

/// Storage key of the persisted [`CacheConfig`], outside [`NAMESPACE`] so no
/// entry key can reach it
pub const CONFIG_KEY: &str = "kwgap_config";

/// Fraction of decodable entries removed by one quota eviction
pub const EVICTION_FRACTION: f64 = 0.25;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// == Persistent Cache ==
/// Quota-bounded, TTL-expiring cache of serializable values.
pub struct PersistentCache {
    /// Backing store
    storage: Box<dyn StoragePort>,
    /// Active configuration, mirrored to `CONFIG_KEY`
    config: CacheConfig,
    /// Performance statistics
    stats: CacheStats,
    clock: Clock,
}

impl PersistentCache {
    // == Constructor ==
    /// Creates a cache over `storage`, loading the persisted config or
    /// falling back to [`CacheConfig::default`].
    pub fn new(storage: impl StoragePort + 'static) -> Self {
        Self::with_fallback_config(storage, CacheConfig::default())
    }

    /// Creates a cache over `storage`, using `fallback` when no config has
    /// been persisted yet.
    pub fn with_fallback_config(storage: impl StoragePort + 'static, fallback: CacheConfig) -> Self {
        let storage: Box<dyn StoragePort> = Box::new(storage);
        let config = match storage.get(CONFIG_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable cache config: {}", e);
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                warn!("Failed to read cache config: {}", e);
                fallback
            }
        };

        Self {
            storage,
            config,
            stats: CacheStats::new(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the clock, for deterministic expiry and ordering.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", NAMESPACE, key)
    }

    // == Save ==
    /// Stores `value` under `key` for `ttl_days` (or the configured expiration).
    ///
    /// A TTL of 0 skips the write. A quota failure triggers eviction and the
    /// value is not written.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T, ttl_days: Option<u32>) {
        let ttl = ttl_days.unwrap_or(self.config.expiration_days);
        if ttl == 0 {
            debug!("Caching disabled, skipping write of '{}'", key);
            return;
        }

        let entry = CacheEntry::new(key, value, self.now(), ttl);
        let encoded = match codec::encode(&entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode cache entry '{}': {}", key, e);
                return;
            }
        };

        match self.storage.set(&Self::namespaced(key), &encoded) {
            Ok(()) => debug!("Cached '{}' for {} days ({} bytes)", key, ttl, encoded.len()),
            Err(StorageError::QuotaExceeded { needed, available }) => {
                warn!(
                    "Storage quota exceeded writing '{}' ({} needed, {} available), evicting",
                    key, needed, available
                );
                self.evict_oldest();
            }
            Err(e) => warn!("Failed to write cache entry '{}': {}", key, e),
        }
    }

    // == Get ==
    /// Returns the value cached under `key` if present, decodable and fresh.
    ///
    /// Corrupt and expired entries are deleted so later reads are clean misses.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if self.config.is_disabled() {
            self.stats.record_miss();
            return None;
        }

        let storage_key = Self::namespaced(key);
        let raw = match self.storage.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                warn!("Failed to read cache entry '{}': {}", key, e);
                self.stats.record_miss();
                return None;
            }
        };

        let entry: CacheEntry<T> = match codec::decode(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Deleting undecodable cache entry '{}': {}", key, e);
                self.delete_raw(&storage_key);
                self.stats.record_corrupt();
                self.stats.record_miss();
                return None;
            }
        };

        if entry.is_expired_at(self.now()) {
            debug!("Deleting expired cache entry '{}'", key);
            self.delete_raw(&storage_key);
            self.stats.record_expired();
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        Some(entry.data)
    }

    // == Remove ==
    /// Deletes the entry under `key`; absent keys are ignored.
    pub fn remove(&mut self, key: &str) {
        self.delete_raw(&Self::namespaced(key));
    }

    fn delete_raw(&mut self, storage_key: &str) {
        if let Err(e) = self.storage.remove(storage_key) {
            warn!("Failed to delete '{}': {}", storage_key, e);
        }
    }

    // == Metadata ==
    /// Returns creation time and age of a decodable entry, expired or not.
    pub fn metadata(&self, key: &str) -> Option<CacheMetadata> {
        let raw = self.storage.get(&Self::namespaced(key)).ok()??;
        let header: EntryHeader = codec::decode(&raw).ok()?;
        Some(CacheMetadata::from_header(&header, self.now()))
    }

    // == Clear All ==
    /// Deletes every cache entry except the config. Returns the number removed.
    pub fn clear_all(&mut self) -> usize {
        let keys = self.entry_keys();
        for key in &keys {
            self.delete_raw(key);
        }
        info!("Cleared {} cache entries", keys.len());
        keys.len()
    }

    // == Config ==
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Replaces the active config and persists it.
    pub fn set_config(&mut self, config: CacheConfig) {
        self.config = config;
        match serde_json::to_string(&config) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(CONFIG_KEY, &raw) {
                    warn!("Failed to persist cache config: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize cache config: {}", e),
        }
        info!("Cache expiration set to {} days", config.expiration_days);
    }

    // == Size ==
    /// Sum of key and value bytes across all entries and the config.
    pub fn size_bytes(&self) -> usize {
        self.entry_keys()
            .into_iter()
            .chain(std::iter::once(CONFIG_KEY.to_string()))
            .filter_map(|key| {
                let value = self.storage.get(&key).ok()??;
                Some(key.len() + value.len())
            })
            .sum()
    }

    /// Number of stored entries, config excluded.
    pub fn len(&self) -> usize {
        self.entry_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Keys of stored entries; the config lives outside the namespace.
    fn entry_keys(&self) -> Vec<String> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(NAMESPACE))
                .collect(),
            Err(e) => {
                warn!("Failed to list cache keys: {}", e);
                Vec::new()
            }
        }
    }

    fn entry_headers(&self) -> Vec<(String, Option<EntryHeader>)> {
        self.entry_keys()
            .into_iter()
            .map(|key| {
                let header = self
                    .storage
                    .get(&key)
                    .ok()
                    .flatten()
                    .and_then(|raw| codec::decode::<EntryHeader>(&raw).ok());
                (key, header)
            })
            .collect()
    }

    // == Evict Oldest ==
    /// Removes the oldest `ceil(25%)` of decodable entries by creation time.
    ///
    /// Undecodable entries are skipped and do not count towards the total.
    pub fn evict_oldest(&mut self) -> usize {
        let mut dated: Vec<(String, DateTime<Utc>)> = self
            .entry_headers()
            .into_iter()
            .filter_map(|(key, header)| header.map(|h| (key, h.timestamp)))
            .collect();
        dated.sort_by_key(|(_, timestamp)| *timestamp);

        let count = (dated.len() as f64 * EVICTION_FRACTION).ceil() as usize;
        for (key, _) in dated.iter().take(count) {
            self.delete_raw(key);
        }

        self.stats.record_evictions(count);
        info!("Quota eviction removed {} of {} entries", count, dated.len());
        count
    }

    // == Purge Expired ==
    /// Deletes every expired or undecodable entry. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.now();
        let mut removed = 0;
        for (key, header) in self.entry_headers() {
            match header {
                Some(h) if now < h.expires_at => continue,
                Some(_) => self.stats.record_expired(),
                None => self.stats.record_corrupt(),
            }
            self.delete_raw(&key);
            removed += 1;
        }
        removed
    }
}
