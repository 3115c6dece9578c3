//! Cache Entry Module
//!
//! Defines the stored envelope for cached payloads, the persisted cache
//! configuration, and the metadata view returned to callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with payload and expiry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Caller-facing key (without namespace prefix)
    pub key: String,
    /// The stored payload
    pub data: T,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Expiration time
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry created at `now` that lives for `ttl_days`.
    pub fn new(key: impl Into<String>, data: T, now: DateTime<Utc>, ttl_days: u32) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp: now,
            expires_at: now + Duration::days(i64::from(ttl_days)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// == Entry Header ==
/// Envelope fields without the payload, used where the payload type is unknown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryHeader {
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// == Cache Config ==
/// Singleton cache configuration, persisted next to the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Time-to-live for new entries in days, 0 disables caching entirely
    pub expiration_days: u32,
}

impl CacheConfig {
    pub fn is_disabled(&self) -> bool {
        self.expiration_days == 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { expiration_days: 7 }
    }
}

// == Cache Metadata ==
/// Age information for a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// When the entry was created
    pub timestamp: DateTime<Utc>,
    /// Whole days elapsed since creation
    pub age_in_days: i64,
}

impl CacheMetadata {
    pub(crate) fn from_header(header: &EntryHeader, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: header.timestamp,
            age_in_days: (now - header.timestamp).num_days(),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expires_after_ttl_days() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", 42u32, now, 3);

        assert_eq!(entry.expires_at - entry.timestamp, Duration::days(3));
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::days(2)));
        assert!(entry.is_expired_at(now + Duration::days(4)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry {
            key: "k".to_string(),
            data: (),
            timestamp: now,
            expires_at: now,
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
    }

    #[test]
    fn test_entry_wire_field_names() {
        let entry = CacheEntry::new("k", "v".to_string(), Utc::now(), 1);
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("key").is_some());
        assert!(json.get("data").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn test_header_ignores_payload() {
        let entry = CacheEntry::new("k", vec![1, 2, 3], Utc::now(), 1);
        let json = serde_json::to_string(&entry).unwrap();
        let header: EntryHeader = serde_json::from_str(&json).unwrap();

        assert_eq!(header.timestamp, entry.timestamp);
        assert_eq!(header.expires_at, entry.expires_at);
    }

    #[test]
    fn test_config_default_and_disabled() {
        assert_eq!(CacheConfig::default().expiration_days, 7);
        assert!(!CacheConfig::default().is_disabled());
        assert!(CacheConfig { expiration_days: 0 }.is_disabled());
    }

    #[test]
    fn test_metadata_age_in_days() {
        let now = Utc::now();
        let header = EntryHeader {
            timestamp: now - Duration::hours(50),
            expires_at: now,
        };

        let meta = CacheMetadata::from_header(&header, now);
        assert_eq!(meta.age_in_days, 2);
    }
}
