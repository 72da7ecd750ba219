//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Time-to-live measured from `inserted_at`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now_ms` - Insertion time in Unix milliseconds
    /// * `ttl` - How long the entry stays visible
    pub fn new(value: V, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            ttl,
        }
    }

    // == Expires At ==
    /// Expiration timestamp in Unix milliseconds.
    pub fn expires_at(&self) -> u64 {
        self.inserted_at
            .saturating_add(self.ttl.as_millis() as u64)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: the entry is visible while `now - inserted_at < ttl`,
    /// so it is expired from the very millisecond the TTL has fully elapsed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at().saturating_sub(now_ms)
    }
}
