//! Session Payload Module
//!
//! Client-carried cart state. The server keeps no copy; integrity comes from
//! the authentication tag attached by the signer.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// == Order Item ==
/// One cart line, priced when the product was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price_minor_units: i64,
}

impl OrderItem {
    pub fn new(product_id: i64, quantity: u32, unit_price_minor_units: i64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price_minor_units,
        }
    }

    /// Line total in minor currency units.
    pub fn total_minor_units(&self) -> i64 {
        self.unit_price_minor_units
            .saturating_mul(i64::from(self.quantity))
    }
}

// == Session Payload ==
/// Wire form of the session: user id, ordered cart lines and the tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Absent for anonymous sessions
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Lowercase hex HMAC over `user_id` and `items`
    #[serde(default)]
    pub auth_tag: Option<String>,
}

/// The tag-covered fields, in canonical order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignedFields<'a> {
    user_id: Option<i64>,
    items: &'a [OrderItem],
}

impl SessionPayload {
    /// Empty anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// No user, no items and no tag: a session the client has never had signed.
    pub fn is_fresh(&self) -> bool {
        self.user_id.is_none() && self.items.is_empty() && self.auth_tag.is_none()
    }

    pub fn item(&self, product_id: i64) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn item_mut(&mut self, product_id: i64) -> Option<&mut OrderItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }

    /// Cart total in minor currency units.
    pub fn total_minor_units(&self) -> i64 {
        self.items
            .iter()
            .map(OrderItem::total_minor_units)
            .fold(0, i64::saturating_add)
    }

    /// Stable key of the cart contents for recommendation lookups.
    ///
    /// Covers the product ids in cart order plus the user id; quantities and
    /// prices do not change the key. Identical across processes.
    pub fn recommendation_key(&self) -> u64 {
        let mut hasher = Sha256::new();
        for item in &self.items {
            hasher.update(item.product_id.to_be_bytes());
        }
        match self.user_id {
            Some(user_id) => {
                hasher.update([1u8]);
                hasher.update(user_id.to_be_bytes());
            }
            None => hasher.update([0u8]),
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }

    /// Canonical bytes covered by the tag: compact JSON of `{userId, items}`.
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        let fields = SignedFields {
            user_id: self.user_id,
            items: &self.items,
        };
        // Serializing plain integers and Options cannot fail.
        serde_json::to_vec(&fields).unwrap_or_default()
    }
}
