//! Response DTOs for the storefront API
//!
//! Bodies of the image and diagnostic endpoints and of every error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

/// Statistics of one registered cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
///
/// Caches are keyed `owner/name`, sorted.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Whether the node currently reports itself down
    pub down: bool,
    pub caches: BTreeMap<String, CacheStatsResponse>,
}

impl StatsResponse {
    pub fn new(down: bool, snapshot: BTreeMap<String, CacheStats>) -> Self {
        Self {
            down,
            caches: snapshot
                .into_iter()
                .map(|(name, stats)| (name, stats.into()))
                .collect(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse stamped with `now`
    pub fn healthy(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
        }
    }
}

/// Response body for the image endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    /// Image as a data URI
    pub data: String,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
