//! Storage Port Module
//!
//! The backing key/value store is injected into the cache through the
//! [`StoragePort`] trait. Implementations enforce a byte quota measured as the
//! sum of key and value lengths and report overruns as
//! [`StorageError::QuotaExceeded`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;

// == Storage Port ==
/// Synchronous string key/value store with a byte quota.
pub trait StoragePort: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently stored.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Checks a pending write of `key`/`value` against `quota`.
///
/// `used` is the current total and `replaced` the size of the value the write
/// would overwrite (key included), 0 when the key is new.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used: usize,
    replaced: usize,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = key.len() + value.len();
    let available = quota.saturating_sub(used.saturating_sub(replaced));
    if needed > available {
        return Err(StorageError::QuotaExceeded { needed, available });
    }
    Ok(())
}

// == Memory Storage ==
#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryInner {
    fn used_bytes(&self) -> usize {
        self.values.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

/// In-memory store. Clones share the same underlying map, so a test can keep
/// a handle and inspect what the cache wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store limited to `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(quota));
        storage
    }

    /// Changes the quota; existing values are kept even if they now exceed it.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.lock().quota = quota;
    }

    /// Total key + value bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.lock().used_bytes()
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().values.contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let replaced = inner.values.get(key).map_or(0, |v| key.len() + v.len());
        check_quota(inner.quota, inner.used_bytes(), replaced, key, value)?;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock().values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock().values.keys().cloned().collect())
    }
}
