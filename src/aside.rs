//! Cache-Aside Module
//!
//! One generic rendition of the read path every request handler follows:
//! availability gate, cache lookup, remote fetch on miss, fill.
//!
//! # Flow
//! ```text
//! is_down? ── yes ──▶ Unavailable
//!    │ no
//! cache hit? ── yes ──▶ value
//!    │ no
//! remote call ── NotFound / Timeout ──▶ error (nothing cached)
//!    │ ok
//! put + value
//! ```

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::availability::{ensure_available, Availability};
use crate::cache::TtlCache;
use crate::error::{RemoteError, Result};

// == Cache Aside ==
/// A named cache bound to an availability gate and an optional remote budget.
#[derive(Debug, Clone)]
pub struct CacheAside<K, V> {
    cache: TtlCache<K, V>,
    availability: Arc<dyn Availability>,
    remote_timeout: Option<Duration>,
    label: &'static str,
}

impl<K, V> CacheAside<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(
        label: &'static str,
        cache: TtlCache<K, V>,
        availability: Arc<dyn Availability>,
    ) -> Self {
        Self {
            cache,
            availability,
            remote_timeout: None,
            label,
        }
    }

    /// Remote calls taking longer than `budget` fail with `Timeout`.
    pub fn with_remote_timeout(mut self, budget: Duration) -> Self {
        self.remote_timeout = Some(budget);
        self
    }

    pub fn cache(&self) -> &TtlCache<K, V> {
        &self.cache
    }

    /// Fails with `Unavailable` if the node is currently down.
    pub fn ensure_available(&self) -> Result<()> {
        ensure_available(self.availability.as_ref(), self.label)
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or fetches, stores and returns it.
    ///
    /// Failures are never cached and never retried.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, RemoteError>>,
    {
        self.ensure_available()?;
        self.lookup_or_fetch(key, fetch).await
    }

    /// Same as `get_or_fetch` without the availability gate, for callers that
    /// already checked it once for the whole request.
    pub async fn lookup_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, RemoteError>>,
    {
        if let Some(value) = self.cache.get(&key) {
            debug!(dataset = self.label, ?key, "Cache hit");
            return Ok(value);
        }
        debug!(dataset = self.label, ?key, "Cache miss");

        let fetched = match self.remote_timeout {
            Some(budget) => match tokio::time::timeout(budget, fetch()).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(format!(
                    "{} {key:?} exceeded {}ms",
                    self.label,
                    budget.as_millis()
                ))),
            },
            None => fetch().await,
        };

        match fetched {
            Ok(value) => {
                self.cache.put(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                debug!(dataset = self.label, ?key, error = %err, "Remote fetch failed");
                Err(err.into())
            }
        }
    }
}
