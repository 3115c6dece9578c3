//! Cache Module
//!
//! Provides a persistent cache with TTL expiration, payload compression and
//! quota-triggered eviction over a pluggable storage backend.

pub mod codec;
mod entry;
mod file_storage;
mod key;
mod stats;
mod storage;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheConfig, CacheEntry, CacheMetadata};
pub use file_storage::FileStorage;
pub use key::{derive_key, ANALYSIS_KEY_PREFIX};
pub use stats::CacheStats;
pub use storage::{MemoryStorage, StoragePort};
pub use store::{Clock, PersistentCache, CONFIG_KEY, EVICTION_FRACTION, NAMESPACE};
