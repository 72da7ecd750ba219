//! Cache Registry Module
//!
//! Hands out named, typed caches. Each cache is addressed by the component
//! that owns it plus a name, so two owners may reuse a name without sharing
//! storage.

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheStats, TtlCache};
use crate::clock::Clock;
use crate::error::{Result, ServiceError};

// == Cache Key ==
/// Registry address of a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheName {
    pub owner: String,
    pub name: String,
}

impl CacheName {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// == Type-erased Handle ==
/// Operations the registry needs on a cache without knowing its types.
trait ManagedCache: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn config(&self) -> CacheConfig;
    fn stats(&self) -> CacheStats;
    fn purge_expired(&self) -> usize;
}

impl<K, V> ManagedCache for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn config(&self) -> CacheConfig {
        TtlCache::config(self)
    }

    fn stats(&self) -> CacheStats {
        TtlCache::stats(self)
    }

    fn purge_expired(&self) -> usize {
        TtlCache::purge_expired(self)
    }
}

// == Cache Manager ==
/// The single underlying store of every registered cache.
#[derive(Default)]
struct CacheManager {
    caches: Mutex<HashMap<CacheName, Arc<dyn ManagedCache>>>,
}

// == Cache Registry ==
/// Explicitly constructed registry of named caches, shared by cloning.
///
/// The manager behind it is created on first use, exactly once, no matter how
/// many threads race for it. For a given name the first caller's capacity and
/// TTL win; later callers get the existing cache.
#[derive(Clone)]
pub struct CacheRegistry {
    manager: Arc<OnceLock<CacheManager>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl CacheRegistry {
    /// Creates a registry whose caches read time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            manager: Arc::new(OnceLock::new()),
            clock,
        }
    }

    /// Whether the underlying manager has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.manager.get().is_some()
    }

    fn manager(&self) -> &CacheManager {
        self.manager.get_or_init(|| {
            info!("Cache manager initialized");
            CacheManager::default()
        })
    }

    // == Get Or Create ==
    /// Returns the cache registered under `(owner, name)`, creating it with
    /// `config` if this is the first request.
    ///
    /// A later request with a different config gets the existing cache and a
    /// warning. A request with different key/value types fails with
    /// `InvalidConfiguration`.
    pub fn get_or_create<K, V>(
        &self,
        owner: &str,
        name: &str,
        config: CacheConfig,
    ) -> Result<TtlCache<K, V>>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Clone + Send + 'static,
    {
        let key = CacheName::new(owner, name);
        let mut caches = self.manager().caches.lock();

        if let Some(existing) = caches.get(&key) {
            let cache = existing
                .as_any()
                .downcast_ref::<TtlCache<K, V>>()
                .ok_or_else(|| {
                    ServiceError::InvalidConfiguration(format!(
                        "cache '{key}' already registered with different key/value types"
                    ))
                })?;

            if cache.config() != config {
                warn!(
                    cache = %key,
                    requested = ?config,
                    existing = ?cache.config(),
                    "Cache already registered; keeping the first configuration"
                );
            }
            return Ok(cache.clone());
        }

        let cache = TtlCache::<K, V>::new(config, Arc::clone(&self.clock))?;
        info!(
            cache = %key,
            capacity = config.capacity,
            ttl_secs = config.ttl.as_secs_f64(),
            "Cache created"
        );
        caches.insert(key, Arc::new(cache.clone()));
        Ok(cache)
    }

    // == Snapshot ==
    /// Statistics of every registered cache keyed by `owner/name`.
    pub fn snapshot(&self) -> BTreeMap<String, CacheStats> {
        let Some(manager) = self.manager.get() else {
            return BTreeMap::new();
        };
        manager
            .caches
            .lock()
            .iter()
            .map(|(name, cache)| (name.to_string(), cache.stats()))
            .collect()
    }

    /// Drops expired entries from every cache; returns the total removed.
    pub fn purge_expired(&self) -> usize {
        let Some(manager) = self.manager.get() else {
            return 0;
        };
        manager
            .caches
            .lock()
            .values()
            .map(|cache| cache.purge_expired())
            .sum()
    }

    /// Number of registered caches.
    pub fn len(&self) -> usize {
        self.manager
            .get()
            .map_or(0, |manager| manager.caches.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn registry() -> (CacheRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_millis(0));
        (CacheRegistry::new(clock.clone()), clock)
    }

    fn config(capacity: usize, ttl_secs: u64) -> CacheConfig {
        CacheConfig::new(capacity, Duration::from_secs(ttl_secs))
    }

    #[test]
    fn test_lazy_initialization() {
        let (registry, _) = registry();
        assert!(!registry.is_initialized());
        assert!(registry.snapshot().is_empty());

        registry
            .get_or_create::<i64, String>("cart", "productCache", config(10, 10))
            .unwrap();

        assert!(registry.is_initialized());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_config_wins() {
        let (registry, _) = registry();

        let first = registry
            .get_or_create::<i64, String>("cart", "productCache", config(100, 10))
            .unwrap();
        let second = registry
            .get_or_create::<i64, String>("cart", "productCache", config(5, 500))
            .unwrap();

        assert!(first.same_storage(&second));
        assert_eq!(second.config(), config(100, 10));
    }

    #[test]
    fn test_owners_are_namespaced() {
        let (registry, _) = registry();

        let cart = registry
            .get_or_create::<i64, String>("cart", "productCache", config(100, 10))
            .unwrap();
        let catalog = registry
            .get_or_create::<i64, String>("catalog", "productCache", config(200, 120))
            .unwrap();

        cart.put(1, "cart".to_string());

        assert!(!cart.same_storage(&catalog));
        assert_eq!(catalog.get(&1), None);
        assert_eq!(catalog.config(), config(200, 120));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let (registry, _) = registry();

        registry
            .get_or_create::<i64, String>("cart", "productCache", config(10, 10))
            .unwrap();
        let result = registry.get_or_create::<String, u32>("cart", "productCache", config(10, 10));

        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected_and_not_registered() {
        let (registry, _) = registry();

        let result = registry.get_or_create::<i64, String>("cart", "bad", config(0, 10));

        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_first_access_shares_storage() {
        let (registry, _) = registry();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let cache = registry
                        .get_or_create::<u32, u32>("load", "shared", config(64, 60))
                        .unwrap();
                    cache.put(i, i * 10);
                    cache
                })
            })
            .collect();

        let caches: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        for cache in &caches {
            assert!(cache.same_storage(&caches[0]));
        }
        for i in 0..8 {
            assert_eq!(caches[0].get(&i), Some(i * 10));
        }
    }

    #[test]
    fn test_snapshot_and_purge() {
        let (registry, clock) = registry();

        let short = registry
            .get_or_create::<u8, u8>("a", "short", config(10, 1))
            .unwrap();
        let long = registry
            .get_or_create::<u8, u8>("a", "long", config(10, 60))
            .unwrap();
        short.put(1, 1);
        long.put(1, 1);
        long.get(&1);

        clock.advance(Duration::from_secs(2));
        assert_eq!(registry.purge_expired(), 1);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot["a/short"].total_entries, 0);
        assert_eq!(snapshot["a/short"].expirations, 1);
        assert_eq!(snapshot["a/long"].hits, 1);
    }
}
