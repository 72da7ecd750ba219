//! In-process remote data capability.
//!
//! Backs the demo binary and the tests. Counts calls so cache-aside behaviour
//! can be observed, and can be told to stall or time out.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use tracing::debug;

use super::{Category, Entity, EntityKind, Order, Product, RemoteData, RemoteResult, User};
use crate::error::RemoteError;
use crate::session::OrderItem;

// == In-Memory Catalog ==
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entities: RwLock<HashMap<EntityKind, BTreeMap<i64, Entity>>>,
    web_images: RwLock<HashMap<String, String>>,
    product_images: RwLock<HashMap<i64, String>>,
    calls: AtomicU64,
    latency: RwLock<Option<Duration>>,
    timing_out: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entity.
    pub fn insert(&self, entity: Entity) {
        self.entities
            .write()
            .entry(entity.kind())
            .or_default()
            .insert(entity.id(), entity);
    }

    pub fn insert_web_image(&self, name: impl Into<String>, data: impl Into<String>) {
        self.web_images.write().insert(name.into(), data.into());
    }

    pub fn insert_product_image(&self, product_id: i64, data: impl Into<String>) {
        self.product_images.write().insert(product_id, data.into());
    }

    /// Number of `fetch_*` calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Makes every call fail with `RemoteError::Timeout`.
    pub fn set_timing_out(&self, timing_out: bool) {
        self.timing_out.store(timing_out, Ordering::SeqCst);
    }

    async fn enter(&self, what: &str) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(what, "Remote call");

        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.timing_out.load(Ordering::SeqCst) {
            return Err(RemoteError::Timeout(what.to_string()));
        }
        Ok(())
    }

    // == Demo Catalog ==
    /// A small tea shop: three categories, a handful of products, one user
    /// with two orders.
    pub fn demo() -> Self {
        let catalog = Self::new();

        let categories = [
            (1, "Black Tea", "Fully oxidized leaves"),
            (2, "Green Tea", "Unoxidized leaves"),
            (3, "Infusions", "Herbs, fruit and flowers"),
        ];
        for (id, name, description) in categories {
            catalog.insert(Entity::Category(Category {
                id,
                name: name.to_string(),
                description: description.to_string(),
            }));
        }

        let products = [
            (1, 1, "Earl Grey", 495),
            (2, 1, "Assam", 450),
            (3, 1, "Darjeeling", 725),
            (4, 2, "Sencha", 620),
            (5, 2, "Gunpowder", 380),
            (6, 3, "Rooibos", 410),
            (7, 3, "Peppermint", 300),
        ];
        for (id, category_id, name, price) in products {
            catalog.insert_product_image(id, placeholder_image(name));
            catalog.insert(Entity::Product(Product {
                id,
                category_id,
                name: name.to_string(),
                description: format!("{name}, 100g loose leaf"),
                list_price_in_cents: price,
            }));
        }

        for name in ["icon", "logo"] {
            catalog.insert_web_image(name, placeholder_image(name));
        }

        catalog.insert(Entity::User(User {
            id: 1,
            user_name: "user1".to_string(),
            real_name: "Jon Doe".to_string(),
            email: "user1@example.com".to_string(),
        }));

        for (id, total, day) in [(1, 1_440, 3), (2, 725, 17)] {
            catalog.insert(Entity::Order(Order {
                id,
                user_id: 1,
                time: Utc
                    .with_ymd_and_hms(2024, 1, day, 10, 0, 0)
                    .single()
                    .unwrap_or_default(),
                total_price_in_cents: total,
                address_name: "Jon Doe".to_string(),
                address1: "1 Main Street".to_string(),
                address2: "Springfield".to_string(),
            }));
        }

        catalog
    }
}

fn placeholder_image(label: &str) -> String {
    format!("data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg'><text>{label}</text></svg>")
}

#[async_trait]
impl RemoteData for InMemoryCatalog {
    async fn fetch_entity(&self, kind: EntityKind, id: i64) -> RemoteResult<Entity> {
        let what = format!("{kind}/{id}");
        self.enter(&what).await?;

        self.entities
            .read()
            .get(&kind)
            .and_then(|by_id| by_id.get(&id))
            .cloned()
            .ok_or(RemoteError::NotFound(what))
    }

    async fn fetch_entities(
        &self,
        kind: EntityKind,
        filter: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> RemoteResult<Vec<Entity>> {
        self.enter(kind.as_str()).await?;

        let offset = offset.max(0) as usize;
        let limit = if limit < 0 { usize::MAX } else { limit as usize };

        let entities = self.entities.read();
        let Some(by_id) = entities.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(by_id
            .values()
            .filter(|entity| filter.map_or(true, |parent| entity.parent_id() == Some(parent)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_web_image(&self, name: &str) -> RemoteResult<String> {
        let what = format!("images/web/{name}");
        self.enter(&what).await?;

        self.web_images
            .read()
            .get(name)
            .cloned()
            .ok_or(RemoteError::NotFound(what))
    }

    async fn fetch_product_image(&self, product_id: i64) -> RemoteResult<String> {
        let what = format!("images/products/{product_id}");
        self.enter(&what).await?;

        self.product_images
            .read()
            .get(&product_id)
            .cloned()
            .ok_or(RemoteError::NotFound(what))
    }

    /// Products not yet in the cart; those sharing a category with a cart
    /// line come first, then the rest, each group by id.
    async fn fetch_recommendations(
        &self,
        items: &[OrderItem],
        _user_id: Option<i64>,
    ) -> RemoteResult<Vec<i64>> {
        self.enter("recommendations").await?;

        let entities = self.entities.read();
        let Some(products) = entities.get(&EntityKind::Products) else {
            return Ok(Vec::new());
        };

        let in_cart: HashSet<i64> = items.iter().map(|item| item.product_id).collect();
        let cart_categories: HashSet<i64> = in_cart
            .iter()
            .filter_map(|id| products.get(id))
            .filter_map(Entity::parent_id)
            .collect();

        let (related, other): (Vec<&Entity>, Vec<&Entity>) = products
            .values()
            .filter(|product| !in_cart.contains(&product.id()))
            .partition(|product| {
                product
                    .parent_id()
                    .is_some_and(|category| cart_categories.contains(&category))
            });

        Ok(related.into_iter().chain(other).map(Entity::id).collect())
    }
}
