//! Entity records served by the persistence tier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

// == Entity Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Categories,
    Products,
    Users,
    Orders,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Categories => "categories",
            EntityKind::Products => "products",
            EntityKind::Users => "users",
            EntityKind::Orders => "orders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub list_price_in_cents: i64,
}

/// Public user profile; credentials never leave the persistence tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub real_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub time: DateTime<Utc>,
    pub total_price_in_cents: i64,
    pub address_name: String,
    pub address1: String,
    pub address2: String,
}

// == Entity ==
/// Any record the remote capability can return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Category(Category),
    Product(Product),
    User(User),
    Order(Order),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Category(_) => EntityKind::Categories,
            Entity::Product(_) => EntityKind::Products,
            Entity::User(_) => EntityKind::Users,
            Entity::Order(_) => EntityKind::Orders,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Entity::Category(c) => c.id,
            Entity::Product(p) => p.id,
            Entity::User(u) => u.id,
            Entity::Order(o) => o.id,
        }
    }

    /// Parent id used by `fetch_entities` filters.
    pub fn parent_id(&self) -> Option<i64> {
        match self {
            Entity::Product(p) => Some(p.category_id),
            Entity::Order(o) => Some(o.user_id),
            Entity::Category(_) | Entity::User(_) => None,
        }
    }
}

fn wrong_kind(expected: EntityKind, got: &Entity) -> RemoteError {
    RemoteError::NotFound(format!(
        "{expected}/{} (remote returned a {} record)",
        got.id(),
        got.kind()
    ))
}

macro_rules! entity_conversion {
    ($variant:ident, $ty:ty, $kind:expr) => {
        impl TryFrom<Entity> for $ty {
            type Error = RemoteError;

            fn try_from(entity: Entity) -> Result<Self, Self::Error> {
                match entity {
                    Entity::$variant(inner) => Ok(inner),
                    other => Err(wrong_kind($kind, &other)),
                }
            }
        }
    };
}

entity_conversion!(Category, Category, EntityKind::Categories);
entity_conversion!(Product, Product, EntityKind::Products);
entity_conversion!(User, User, EntityKind::Users);
entity_conversion!(Order, Order, EntityKind::Orders);

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: 7,
            category_id: 2,
            name: "Earl Grey".to_string(),
            description: "Black tea".to_string(),
            list_price_in_cents: 500,
        }
    }

    #[test]
    fn test_try_from_matching_kind() {
        let entity = Entity::Product(product());
        assert_eq!(Product::try_from(entity).unwrap(), product());
    }

    #[test]
    fn test_try_from_wrong_kind() {
        let entity = Entity::Product(product());
        assert!(matches!(User::try_from(entity), Err(RemoteError::NotFound(_))));
    }

    #[test]
    fn test_parent_ids() {
        assert_eq!(Entity::Product(product()).parent_id(), Some(2));
        assert_eq!(EntityKind::Products.to_string(), "products");
    }
}
