//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, plus the
//! registry that hands named caches out to request handlers.

mod entry;
mod lru;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use registry::{CacheName, CacheRegistry};
pub use stats::CacheStats;
pub use store::{CacheConfig, TtlCache};
