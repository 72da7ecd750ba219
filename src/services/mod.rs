//! Services Module
//!
//! Request-handling components built on the cache-aside layer.
//!
//! # Services
//! - `CartService`: signed cart mutations
//! - `CatalogService`: cached reads of categories, products, images,
//!   recommendations, users and orders

mod cart;
mod catalog;

pub use cart::{CartService, TamperedSessionPolicy, CART_OWNER};
pub use catalog::{CatalogService, ProductPage, CATALOG_OWNER, MAX_RECOMMENDATIONS};

use crate::error::RemoteError;
use crate::remote::{Entity, EntityKind, Product, RemoteData};

/// Fetches a single product and checks the record kind.
pub(crate) async fn fetch_product(
    remote: &dyn RemoteData,
    id: i64,
) -> std::result::Result<Product, RemoteError> {
    remote
        .fetch_entity(EntityKind::Products, id)
        .await
        .and_then(Product::try_from)
}

/// Converts a page of entities, failing on the first record of the wrong kind.
pub(crate) fn convert_all<T>(entities: Vec<Entity>) -> std::result::Result<Vec<T>, RemoteError>
where
    T: TryFrom<Entity, Error = RemoteError>,
{
    entities.into_iter().map(T::try_from).collect()
}
