//! Cart Service
//!
//! Add, remove and re-quantify cart lines inside a client-carried session.
//! Every successful mutation re-signs the payload before it is returned.

use std::sync::Arc;

use tracing::{info, warn};

use super::fetch_product;
use crate::aside::CacheAside;
use crate::availability::{ensure_available, Availability};
use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::remote::{Product, RemoteData};
use crate::session::{OrderItem, SessionPayload, SessionSigner};

/// Registry owner of the cart's caches.
pub const CART_OWNER: &str = "cart";

// == Tampered Session Policy ==
/// What to do with an inbound payload whose tag does not verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamperedSessionPolicy {
    /// Fail the request with `TagMismatch`
    Reject,
    /// Carry on with an empty anonymous session
    Reset,
}

// == Cart Service ==
pub struct CartService {
    availability: Arc<dyn Availability>,
    products: CacheAside<i64, Product>,
    remote: Arc<dyn RemoteData>,
    signer: SessionSigner,
    tampered: TamperedSessionPolicy,
}

impl CartService {
    pub fn new(
        registry: &CacheRegistry,
        availability: Arc<dyn Availability>,
        remote: Arc<dyn RemoteData>,
        signer: SessionSigner,
        config: &Config,
    ) -> Result<Self> {
        let cache = registry.get_or_create::<i64, Product>(
            CART_OWNER,
            "productCache",
            config.cart_product_cache.cache_config(),
        )?;
        let products = CacheAside::new("cart.products", cache, Arc::clone(&availability))
            .with_remote_timeout(config.remote_timeout());
        let tampered = if config.reset_tampered_sessions {
            TamperedSessionPolicy::Reset
        } else {
            TamperedSessionPolicy::Reject
        };

        Ok(Self {
            availability,
            products,
            remote,
            signer,
            tampered,
        })
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    pub fn tampered_policy(&self) -> TamperedSessionPolicy {
        self.tampered
    }

    // == Admit ==
    /// Accepts a fresh or correctly signed payload; handles anything else per
    /// the tampered-session policy.
    pub fn admit(&self, payload: SessionPayload) -> Result<SessionPayload> {
        if payload.is_fresh() || self.signer.verify(&payload) {
            return Ok(payload);
        }
        match self.tampered {
            TamperedSessionPolicy::Reject => {
                warn!(user_id = ?payload.user_id, "Rejecting session with invalid tag");
                Err(ServiceError::TagMismatch)
            }
            TamperedSessionPolicy::Reset => {
                warn!(user_id = ?payload.user_id, "Resetting session with invalid tag");
                Ok(SessionPayload::anonymous())
            }
        }
    }

    // == Add Product ==
    /// Adds one unit of `product_id`. An existing line is incremented;
    /// otherwise a line priced at the product's list price is appended.
    pub async fn add_product(
        &self,
        payload: SessionPayload,
        product_id: i64,
    ) -> Result<SessionPayload> {
        ensure_available(self.availability.as_ref(), "cart.add")?;
        let mut payload = self.admit(payload)?;

        let product = self
            .products
            .lookup_or_fetch(product_id, || fetch_product(self.remote.as_ref(), product_id))
            .await?;

        match payload.item_mut(product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => payload.items.push(OrderItem::new(
                product_id,
                1,
                product.list_price_in_cents,
            )),
        }

        info!(product_id, "Product added to cart");
        Ok(self.signer.sign(payload))
    }

    // == Remove Product ==
    /// Drops the line for `product_id`; `NotFound` if the cart has none.
    pub async fn remove_product(
        &self,
        payload: SessionPayload,
        product_id: i64,
    ) -> Result<SessionPayload> {
        ensure_available(self.availability.as_ref(), "cart.remove")?;
        let mut payload = self.admit(payload)?;

        let Some(index) = payload
            .items
            .iter()
            .position(|item| item.product_id == product_id)
        else {
            return Err(ServiceError::NotFound(format!("cart item {product_id}")));
        };
        payload.items.remove(index);

        info!(product_id, "Product removed from cart");
        Ok(self.signer.sign(payload))
    }

    // == Update Quantity ==
    /// Sets the quantity of an existing line; `NotFound` if the cart has none.
    pub async fn update_quantity(
        &self,
        payload: SessionPayload,
        product_id: i64,
        quantity: u32,
    ) -> Result<SessionPayload> {
        ensure_available(self.availability.as_ref(), "cart.update")?;
        let mut payload = self.admit(payload)?;

        let item = payload
            .item_mut(product_id)
            .ok_or_else(|| ServiceError::NotFound(format!("cart item {product_id}")))?;
        item.quantity = quantity;

        info!(product_id, quantity, "Cart quantity updated");
        Ok(self.signer.sign(payload))
    }
}
