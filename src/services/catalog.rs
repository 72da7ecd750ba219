//! Catalog Service
//!
//! Cached reads of the storefront datasets. Each dataset lives in its own
//! named cache under the `catalog` owner.
//!
//! Recommendations are cached per cart contents and user, as product ids;
//! the products themselves come through the product cache.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{convert_all, fetch_product};
use crate::aside::CacheAside;
use crate::availability::Availability;
use crate::cache::{CacheConfig, CacheRegistry, TtlCache};
use crate::config::Config;
use crate::error::{RemoteError, Result};
use crate::remote::{Category, EntityKind, Order, Product, RemoteData, User};
use crate::session::SessionPayload;

/// Registry owner of the catalog's caches.
pub const CATALOG_OWNER: &str = "catalog";

/// Most products returned by one recommendation read.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Key of one cached page of a category's products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductPage {
    pub category_id: i64,
    pub offset: i64,
    pub limit: i64,
}

// == Catalog Service ==
pub struct CatalogService {
    products: CacheAside<i64, Product>,
    categories: CacheAside<(), Vec<Category>>,
    category: CacheAside<i64, Category>,
    category_products: CacheAside<ProductPage, Vec<Product>>,
    users: CacheAside<i64, User>,
    orders: CacheAside<i64, Vec<Order>>,
    web_images: CacheAside<String, String>,
    product_images: CacheAside<i64, String>,
    recommendations: CacheAside<u64, Vec<i64>>,
    remote: Arc<dyn RemoteData>,
}

impl CatalogService {
    pub fn new(
        registry: &CacheRegistry,
        availability: Arc<dyn Availability>,
        remote: Arc<dyn RemoteData>,
        config: &Config,
    ) -> Result<Self> {
        let budget = config.remote_timeout();

        let products = registry.get_or_create::<i64, Product>(
            CATALOG_OWNER,
            "productCache",
            config.product_cache.cache_config(),
        )?;
        let categories = registry.get_or_create::<(), Vec<Category>>(
            CATALOG_OWNER,
            "categoriesCache",
            config.category_cache.cache_config(),
        )?;
        let category = registry.get_or_create::<i64, Category>(
            CATALOG_OWNER,
            "categoryCache",
            config.category_cache.cache_config(),
        )?;
        let category_products = registry.get_or_create::<ProductPage, Vec<Product>>(
            CATALOG_OWNER,
            "categoryProductsCache",
            config.category_products_cache.cache_config(),
        )?;
        let users = registry.get_or_create::<i64, User>(
            CATALOG_OWNER,
            "userCache",
            config.user_cache.cache_config(),
        )?;
        let orders = registry.get_or_create::<i64, Vec<Order>>(
            CATALOG_OWNER,
            "orderCache",
            config.order_cache.cache_config(),
        )?;
        let web_images = registry.get_or_create::<String, String>(
            CATALOG_OWNER,
            "webImageCache",
            config.web_image_cache.cache_config(),
        )?;
        let product_images = registry.get_or_create::<i64, String>(
            CATALOG_OWNER,
            "productImageCache",
            config.product_image_cache.cache_config(),
        )?;
        let recommendations = registry.get_or_create::<u64, Vec<i64>>(
            CATALOG_OWNER,
            "recommendationsCache",
            config.recommendation_cache.cache_config(),
        )?;

        Ok(Self {
            products: guarded("catalog.products", products, &availability, budget),
            categories: guarded("catalog.categories", categories, &availability, budget),
            category: guarded("catalog.category", category, &availability, budget),
            category_products: guarded(
                "catalog.category_products",
                category_products,
                &availability,
                budget,
            ),
            users: guarded("catalog.users", users, &availability, budget),
            orders: guarded("catalog.orders", orders, &availability, budget),
            web_images: guarded("catalog.web_images", web_images, &availability, budget),
            product_images: guarded(
                "catalog.product_images",
                product_images,
                &availability,
                budget,
            ),
            recommendations: guarded(
                "catalog.recommendations",
                recommendations,
                &availability,
                budget,
            ),
            remote,
        })
    }

    /// Product by id.
    pub async fn product(&self, id: i64) -> Result<Product> {
        self.products
            .get_or_fetch(id, || fetch_product(self.remote.as_ref(), id))
            .await
    }

    /// Every category.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.categories
            .get_or_fetch((), || async {
                let entities = self
                    .remote
                    .fetch_entities(EntityKind::Categories, None, -1, -1)
                    .await?;
                convert_all::<Category>(entities)
            })
            .await
    }

    /// Category by id.
    pub async fn category(&self, id: i64) -> Result<Category> {
        self.category
            .get_or_fetch(id, || async {
                self.remote
                    .fetch_entity(EntityKind::Categories, id)
                    .await
                    .and_then(Category::try_from)
            })
            .await
    }

    /// One page of the products in `category_id`.
    ///
    /// A negative `offset` starts at the first product; a negative `limit`
    /// returns the rest of the category.
    pub async fn category_products(
        &self,
        category_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>> {
        let page = ProductPage {
            category_id,
            offset: offset.max(-1),
            limit: limit.max(-1),
        };
        self.category_products
            .get_or_fetch(page, || async {
                let entities = self
                    .remote
                    .fetch_entities(EntityKind::Products, Some(category_id), offset, limit)
                    .await?;
                convert_all::<Product>(entities)
            })
            .await
    }

    /// User profile by id.
    pub async fn user(&self, id: i64) -> Result<User> {
        self.users
            .get_or_fetch(id, || async {
                self.remote
                    .fetch_entity(EntityKind::Users, id)
                    .await
                    .and_then(User::try_from)
            })
            .await
    }

    /// Order history of `user_id`, oldest first.
    pub async fn orders(&self, user_id: i64) -> Result<Vec<Order>> {
        self.orders
            .get_or_fetch(user_id, || async {
                let entities = self
                    .remote
                    .fetch_entities(EntityKind::Orders, Some(user_id), -1, -1)
                    .await?;
                let mut orders: Vec<Order> = convert_all(entities)?;
                orders.sort_by_key(|order| order.time);
                Ok::<_, RemoteError>(orders)
            })
            .await
    }

    /// Storefront image by name, as a data URI.
    pub async fn web_image(&self, name: &str) -> Result<String> {
        self.web_images
            .get_or_fetch(name.to_string(), || self.remote.fetch_web_image(name))
            .await
    }

    /// Image of a product, as a data URI.
    pub async fn product_image(&self, product_id: i64) -> Result<String> {
        self.product_images
            .get_or_fetch(product_id, || self.remote.fetch_product_image(product_id))
            .await
    }

    /// Up to `MAX_RECOMMENDATIONS` products to advertise next to a cart.
    ///
    /// The recommended ids are cached under `SessionPayload::recommendation_key`,
    /// so carts holding the same products for the same user share one entry.
    pub async fn recommendations(&self, payload: &SessionPayload) -> Result<Vec<Product>> {
        let ids = self
            .recommendations
            .get_or_fetch(payload.recommendation_key(), || {
                self.remote
                    .fetch_recommendations(&payload.items, payload.user_id)
            })
            .await?;

        let mut products = Vec::with_capacity(MAX_RECOMMENDATIONS);
        for id in ids.into_iter().take(MAX_RECOMMENDATIONS) {
            let product = self
                .products
                .lookup_or_fetch(id, || fetch_product(self.remote.as_ref(), id))
                .await?;
            products.push(product);
        }
        Ok(products)
    }

    /// Configuration of the product cache, for diagnostics.
    pub fn product_cache_config(&self) -> CacheConfig {
        self.products.cache().config()
    }
}

fn guarded<K, V>(
    label: &'static str,
    cache: TtlCache<K, V>,
    availability: &Arc<dyn Availability>,
    budget: Duration,
) -> CacheAside<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    CacheAside::new(label, cache, Arc::clone(availability)).with_remote_timeout(budget)
}
