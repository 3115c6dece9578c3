//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify round-trip, disabled-cache, eviction and key
//! derivation properties.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use crate::cache::{derive_key, CacheConfig, Clock, MemoryStorage, PersistentCache};

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:.]{1,64}".prop_map(|s| s)
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,256}".prop_map(|s| s)
}

fn source_id_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}\\.(com|io|net)".prop_map(|s| s)
}

fn stepping_clock() -> (Clock, Arc<Mutex<DateTime<Utc>>>) {
    let now = Arc::new(Mutex::new(Utc::now()));
    let handle = now.clone();
    (Arc::new(move || *handle.lock().unwrap()), now)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Save then get returns the stored value for any TTL > 0.
    #[test]
    fn prop_roundtrip_storage(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl in 1u32..365
    ) {
        let mut cache = PersistentCache::new(MemoryStorage::new());

        cache.save(&key, &value, Some(ttl));
        let retrieved: Option<String> = cache.get(&key);
        prop_assert_eq!(retrieved, Some(value));
    }

    // With expiration 0 nothing is written and nothing is read.
    #[test]
    fn prop_disabled_cache(key in valid_key_strategy(), value in valid_value_strategy()) {
        let storage = MemoryStorage::new();
        let mut cache = PersistentCache::new(storage.clone());
        cache.set_config(CacheConfig { expiration_days: 0 });

        cache.save(&key, &value, None);
        prop_assert_eq!(cache.get::<String>(&key), None);
        prop_assert!(cache.is_empty());
        // Only the config is stored
        prop_assert_eq!(storage.len(), 1);
    }

    // Entries past their TTL read as absent and are gone afterwards.
    #[test]
    fn prop_expiry_removes_entry(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl in 1u32..30,
        extra_hours in 0i64..1000
    ) {
        let (clock, now) = stepping_clock();
        let storage = MemoryStorage::new();
        let mut cache = PersistentCache::new(storage.clone()).with_clock(clock);

        cache.save(&key, &value, Some(ttl));
        *now.lock().unwrap() += Duration::days(i64::from(ttl)) + Duration::hours(extra_hours);

        prop_assert_eq!(cache.get::<String>(&key), None);
        prop_assert!(storage.is_empty());
    }

    // One eviction removes ceil(n / 4) entries, always the oldest ones.
    #[test]
    fn prop_eviction_removes_oldest_quarter(count in 1usize..40) {
        let (clock, now) = stepping_clock();
        let mut cache = PersistentCache::new(MemoryStorage::new()).with_clock(clock);
        for i in 0..count {
            cache.save(&format!("entry{}", i), &i, None);
            *now.lock().unwrap() += Duration::seconds(1);
        }

        let removed = cache.evict_oldest();
        prop_assert_eq!(removed, (count + 3) / 4);
        prop_assert_eq!(cache.len(), count - removed);
        for i in 0..count {
            let present = cache.metadata(&format!("entry{}", i)).is_some();
            prop_assert_eq!(present, i >= removed);
        }
    }

    // Keys ignore source order and track source membership.
    #[test]
    fn prop_key_stability(
        domain in "[a-z]{1,10}\\.com",
        ids in prop::collection::vec(source_id_strategy(), 0..8),
        extra in source_id_strategy()
    ) {
        let mut reversed = ids.clone();
        reversed.reverse();
        prop_assert_eq!(derive_key(&domain, &ids), derive_key(&domain, &reversed));

        let unique: HashSet<&String> = ids.iter().collect();
        if !unique.contains(&extra) {
            let mut grown = ids.clone();
            grown.push(extra.clone());
            prop_assert_ne!(derive_key(&domain, &ids), derive_key(&domain, &grown));
        }
    }
}
