//! Remote Data Module
//!
//! The opaque persistence, image and recommender capability the guard layer
//! shields. Any transport (in-process, RPC, HTTP) works as long as it
//! implements `RemoteData`.

mod entities;
mod memory;

pub use entities::{Category, Entity, EntityKind, Order, Product, User};
pub use memory::InMemoryCatalog;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::session::OrderItem;

/// Result of a remote call.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

// == Remote Data Trait ==
/// Fetches entities from the persistence tier.
///
/// Implementations own their retry policy; callers never retry.
#[async_trait]
pub trait RemoteData: Send + Sync {
    /// Fetches one entity of `kind` by id.
    async fn fetch_entity(&self, kind: EntityKind, id: i64) -> RemoteResult<Entity>;

    /// Fetches a page of entities of `kind`.
    ///
    /// `filter` narrows by parent id (category of a product, user of an
    /// order). A negative `offset` means 0, a negative `limit` means no limit.
    async fn fetch_entities(
        &self,
        kind: EntityKind,
        filter: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> RemoteResult<Vec<Entity>>;

    /// Fetches a storefront image (icon, logo) by name, encoded as a data URI.
    async fn fetch_web_image(&self, name: &str) -> RemoteResult<String>;

    /// Fetches the image of a product, encoded as a data URI.
    async fn fetch_product_image(&self, product_id: i64) -> RemoteResult<String>;

    /// Asks the recommender which product ids to advertise next to a cart,
    /// best first.
    async fn fetch_recommendations(
        &self,
        items: &[OrderItem],
        user_id: Option<i64>,
    ) -> RemoteResult<Vec<i64>>;
}
