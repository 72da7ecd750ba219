//! Tea Guard - Resilience and caching layer for a storefront
//!
//! Provides named TTL caches with LRU eviction, a deterministic outage
//! simulator, HMAC-signed client sessions and cache-aside request handlers
//! in front of an opaque persistence tier.

pub mod api;
pub mod aside;
pub mod availability;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod session;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, ServiceError};
