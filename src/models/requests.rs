//! Request DTOs for the storefront API
//!
//! Query strings accepted next to the JSON bodies. Cart bodies are the
//! session wire form itself (`SessionPayload`).

use serde::Deserialize;

/// Query of `PUT /cart/:pid`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuantityQuery {
    /// New quantity of the cart line
    pub quantity: u32,
}

/// Paging query of `GET /categories/:id/products`
///
/// # Fields
/// - `offset`: Index of the first product, negative means 0 (default: -1)
/// - `limit`: Maximum page size, negative means all (default: -1)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "unbounded")]
    pub offset: i64,
    #[serde(default = "unbounded")]
    pub limit: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            offset: unbounded(),
            limit: unbounded(),
        }
    }
}

fn unbounded() -> i64 {
    -1
}
