//! API Module
//!
//! HTTP handlers and routing for the storefront guard REST API.
//!
//! # Endpoints
//! - `POST /cart/add/:pid`, `POST /cart/remove/:pid`, `PUT /cart/:pid` - Cart
//!   mutations on the signed session payload
//! - `GET /products/:id`, `GET /categories`, `GET /categories/:id`,
//!   `GET /categories/:id/products`, `GET /users/:id`,
//!   `GET /users/:id/orders` - Cached catalog reads
//! - `GET /products/:id/image`, `GET /images/:name` - Cached images
//! - `POST /recommendations` - Cached recommendations for a cart
//! - `GET /stats` - Per-cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
