//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::clock::Clock;
use crate::error::{Result, ServiceError};

// == Cache Config ==
/// Capacity and TTL of a single cache, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// Time-to-live applied to every entry
    pub ttl: Duration,
}

impl CacheConfig {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { capacity, ttl }
    }

    /// Rejects a zero capacity or a zero TTL.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ServiceError::InvalidConfiguration(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(ServiceError::InvalidConfiguration(
                "cache TTL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// == Cache State ==
/// Everything guarded by the cache lock.
#[derive(Debug)]
struct CacheState<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop_entry(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}

// == TTL Cache ==
/// Bounded key-value cache with per-entry TTL and LRU eviction.
///
/// Cloning yields another handle onto the same storage. All synchronization
/// happens inside; callers never lock.
///
/// Eviction policy is least-recently-used: `put` and a successful `get` mark a
/// key as most recently used, `contains` does not.
pub struct TtlCache<K, V> {
    state: Arc<Mutex<CacheState<K, V>>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            config: self.config,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// Fails with `InvalidConfiguration` on a zero capacity or TTL.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::new(),
            })),
            config,
            clock,
        })
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    // == Put ==
    /// Inserts or overwrites a value, resetting its age to zero.
    ///
    /// When the cache is full and `key` is new, the least recently used entry
    /// is evicted first.
    pub fn put(&self, key: K, value: V) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let is_overwrite = state.entries.contains_key(&key);
        if !is_overwrite && state.entries.len() >= self.config.capacity {
            if let Some(evicted_key) = state.lru.evict_oldest() {
                state.entries.remove(&evicted_key);
                state.stats.record_eviction();
            }
        }

        state
            .entries
            .insert(key.clone(), CacheEntry::new(value, now, self.config.ttl));
        state.lru.touch(&key);
        let total = state.entries.len();
        state.stats.set_total_entries(total);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry counts as a miss and is purged.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                state.stats.record_hit();
                state.lru.touch(key);
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.drop_entry(key);
            state.stats.record_expirations(1);
        }
        state.stats.record_miss();
        None
    }

    // == Contains ==
    /// Pure peek: true iff `get` would hit. Touches neither recency nor stats.
    pub fn contains(&self, key: &K) -> bool {
        let now = self.clock.now_ms();
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Remove ==
    /// Removes an entry. Absent keys are a no-op; returns whether one existed.
    pub fn remove(&self, key: &K) -> bool {
        self.state.lock().drop_entry(key)
    }

    // == Purge Expired ==
    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let expired_keys: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            state.drop_entry(key);
        }
        state.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// True if both handles point at the same storage.
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::thread;

    fn cache_with_clock(capacity: usize, ttl_secs: u64) -> (TtlCache<String, i32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_millis(1_000_000));
        let cache = TtlCache::new(
            CacheConfig::new(capacity, Duration::from_secs(ttl_secs)),
            clock.clone(),
        )
        .unwrap();
        (cache, clock)
    }

    #[test]
    fn test_store_new() {
        let (cache, _) = cache_with_clock(100, 300);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rejects_zero_capacity_and_ttl() {
        let clock = Arc::new(ManualClock::default());
        let zero_cap = TtlCache::<u8, u8>::new(
            CacheConfig::new(0, Duration::from_secs(1)),
            clock.clone(),
        );
        let zero_ttl = TtlCache::<u8, u8>::new(CacheConfig::new(1, Duration::ZERO), clock);

        assert!(matches!(zero_cap, Err(ServiceError::InvalidConfiguration(_))));
        assert!(matches!(zero_ttl, Err(ServiceError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_store_put_and_get() {
        let (cache, _) = cache_with_clock(100, 300);

        cache.put("key1".to_string(), 1);

        assert_eq!(cache.get(&"key1".to_string()), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (cache, _) = cache_with_clock(100, 300);
        assert_eq!(cache.get(&"nonexistent".to_string()), None);
    }

    #[test]
    fn test_store_overwrite_resets_age() {
        let (cache, clock) = cache_with_clock(100, 10);
        let key = "key1".to_string();

        cache.put(key.clone(), 1);
        clock.advance(Duration::from_secs(8));
        cache.put(key.clone(), 2);
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get(&key), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (cache, clock) = cache_with_clock(100, 10);
        let key = "key1".to_string();

        cache.put(key.clone(), 1);
        clock.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get(&key), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty(), "Expired entry should be purged on access");
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_capacity_one_evicts_previous() {
        let (cache, _) = cache_with_clock(1, 10);

        cache.put("A".to_string(), 1);
        cache.put("B".to_string(), 2);

        assert_eq!(cache.get(&"A".to_string()), None);
        assert_eq!(cache.get(&"B".to_string()), Some(2));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let (cache, _) = cache_with_clock(3, 300);

        cache.put("key1".to_string(), 1);
        cache.put("key2".to_string(), 2);
        cache.put("key3".to_string(), 3);

        // Access key1 to make it most recently used
        cache.get(&"key1".to_string());

        // Adding key4 should evict key2 (now oldest)
        cache.put("key4".to_string(), 4);

        assert!(cache.contains(&"key1".to_string()));
        assert!(!cache.contains(&"key2".to_string()));
    }

    #[test]
    fn test_contains_does_not_touch_recency() {
        let (cache, _) = cache_with_clock(2, 300);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert!(cache.contains(&"a".to_string()));

        cache.put("c".to_string(), 3);

        assert!(!cache.contains(&"a".to_string()));
        assert!(cache.contains(&"b".to_string()));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_contains_respects_expiry() {
        let (cache, clock) = cache_with_clock(10, 5);

        cache.put("a".to_string(), 1);
        clock.advance(Duration::from_secs(5));

        assert!(!cache.contains(&"a".to_string()));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (cache, _) = cache_with_clock(10, 5);

        cache.put("a".to_string(), 1);

        assert!(!cache.remove(&"missing".to_string()));
        assert!(cache.remove(&"a".to_string()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_purge_expired() {
        let (cache, clock) = cache_with_clock(100, 10);

        cache.put("short".to_string(), 1);
        clock.advance(Duration::from_secs(6));
        cache.put("long".to_string(), 2);
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"long".to_string()), Some(2));
    }

    #[test]
    fn test_store_stats() {
        let (cache, _) = cache_with_clock(100, 300);

        cache.put("key1".to_string(), 1);
        cache.get(&"key1".to_string());
        cache.get(&"nonexistent".to_string());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let (cache, _) = cache_with_clock(10, 300);
        let other = cache.clone();

        other.put("shared".to_string(), 9);

        assert!(cache.same_storage(&other));
        assert_eq!(cache.get(&"shared".to_string()), Some(9));
    }

    #[test]
    fn test_concurrent_writers_never_exceed_capacity() {
        let (cache, _) = cache_with_clock(16, 300);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{t}-{i}");
                        cache.put(key.clone(), i);
                        if let Some(v) = cache.get(&key) {
                            assert!((0..100).contains(&v));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 16);
    }
}
