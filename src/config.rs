//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::availability::FAILURE_WINDOW_SECONDS;
use crate::cache::CacheConfig;
use crate::error::{Result, ServiceError};

/// Secret used when `SESSION_SECRET` is unset. Only fit for development.
pub const DEFAULT_SESSION_SECRET: &str = "tea-guard-development-secret";

// == Cache Settings ==
/// Capacity and TTL of one named cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl CacheSettings {
    pub const fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self { capacity, ttl_secs }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.capacity, Duration::from_secs(self.ttl_secs))
    }

    /// Reads `<PREFIX>_CACHE_CAPACITY` and `<PREFIX>_CACHE_TTL`.
    fn from_env(prefix: &str, default: CacheSettings) -> Self {
        Self {
            capacity: env_or(&format!("{prefix}_CACHE_CAPACITY"), default.capacity),
            ttl_secs: env_or(&format!("{prefix}_CACHE_TTL"), default.ttl_secs),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Shared secret for session tags
    pub session_secret: String,
    /// Seconds of synthetic outage per 10-second window, 0 disables
    pub failure_seconds: u8,
    /// Budget for a single remote call in milliseconds
    pub remote_timeout_ms: u64,
    /// Replace tampered sessions with an empty one instead of rejecting
    pub reset_tampered_sessions: bool,
    /// Products looked up by the cart
    pub cart_product_cache: CacheSettings,
    /// Products looked up by id in the catalog
    pub product_cache: CacheSettings,
    /// The full category list and categories by id
    pub category_cache: CacheSettings,
    /// Product pages per category
    pub category_products_cache: CacheSettings,
    pub user_cache: CacheSettings,
    /// Order history per user
    pub order_cache: CacheSettings,
    /// Storefront images by name
    pub web_image_cache: CacheSettings,
    /// Product images by product id
    pub product_image_cache: CacheSettings,
    /// Recommended product ids per cart contents
    pub recommendation_cache: CacheSettings,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SESSION_SECRET` - Session tag secret (default: development secret)
    /// - `FAILURE_SECONDS` - Synthetic outage seconds per window (default: 0)
    /// - `REMOTE_TIMEOUT_MS` - Remote call budget (default: 2000)
    /// - `RESET_TAMPERED_SESSIONS` - Reset instead of reject (default: false)
    /// - `<DATASET>_CACHE_CAPACITY` / `<DATASET>_CACHE_TTL` for `CART_PRODUCT`,
    ///   `PRODUCT`, `CATEGORY`, `CATEGORY_PRODUCTS`, `USER`, `ORDER`, `WEB_IMAGE`,
    ///   `PRODUCT_IMAGE`, `RECOMMENDATION`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            session_secret: env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            failure_seconds: env_or("FAILURE_SECONDS", defaults.failure_seconds),
            remote_timeout_ms: env_or("REMOTE_TIMEOUT_MS", defaults.remote_timeout_ms),
            reset_tampered_sessions: env_or(
                "RESET_TAMPERED_SESSIONS",
                defaults.reset_tampered_sessions,
            ),
            cart_product_cache: CacheSettings::from_env(
                "CART_PRODUCT",
                defaults.cart_product_cache,
            ),
            product_cache: CacheSettings::from_env("PRODUCT", defaults.product_cache),
            category_cache: CacheSettings::from_env("CATEGORY", defaults.category_cache),
            category_products_cache: CacheSettings::from_env(
                "CATEGORY_PRODUCTS",
                defaults.category_products_cache,
            ),
            user_cache: CacheSettings::from_env("USER", defaults.user_cache),
            order_cache: CacheSettings::from_env("ORDER", defaults.order_cache),
            web_image_cache: CacheSettings::from_env("WEB_IMAGE", defaults.web_image_cache),
            product_image_cache: CacheSettings::from_env(
                "PRODUCT_IMAGE",
                defaults.product_image_cache,
            ),
            recommendation_cache: CacheSettings::from_env(
                "RECOMMENDATION",
                defaults.recommendation_cache,
            ),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// True when the development secret is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }

    /// Rejects values that would make startup fail later.
    pub fn validate(&self) -> Result<()> {
        if self.session_secret.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "SESSION_SECRET must not be empty".to_string(),
            ));
        }
        if self.failure_seconds > FAILURE_WINDOW_SECONDS {
            return Err(ServiceError::InvalidConfiguration(format!(
                "FAILURE_SECONDS must be between 0 and {FAILURE_WINDOW_SECONDS}, got {}",
                self.failure_seconds
            )));
        }
        if self.remote_timeout_ms == 0 {
            return Err(ServiceError::InvalidConfiguration(
                "REMOTE_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        for settings in [
            self.cart_product_cache,
            self.product_cache,
            self.category_cache,
            self.category_products_cache,
            self.user_cache,
            self.order_cache,
            self.web_image_cache,
            self.product_image_cache,
            self.recommendation_cache,
        ] {
            settings.cache_config().validate()?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            failure_seconds: 0,
            remote_timeout_ms: 2000,
            reset_tampered_sessions: false,
            cart_product_cache: CacheSettings::new(100, 10),
            product_cache: CacheSettings::new(200, 120),
            category_cache: CacheSettings::new(20, 120),
            category_products_cache: CacheSettings::new(100, 120),
            user_cache: CacheSettings::new(100, 60),
            order_cache: CacheSettings::new(100, 30),
            web_image_cache: CacheSettings::new(10, 10),
            product_image_cache: CacheSettings::new(500, 10),
            recommendation_cache: CacheSettings::new(500, 100),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
