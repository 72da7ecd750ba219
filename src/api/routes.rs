//! API Routes
//!
//! Configures the Axum router with all storefront endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_to_cart_handler, categories_handler, category_handler, category_products_handler,
    health_handler, product_handler, product_image_handler, recommendations_handler,
    remove_from_cart_handler, stats_handler, update_quantity_handler, user_handler,
    user_orders_handler, web_image_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /cart/add/:pid` - Add one unit of a product to the session cart
/// - `POST /cart/remove/:pid` - Drop a product from the session cart
/// - `PUT /cart/:pid?quantity=N` - Set the quantity of a cart line
/// - `GET /products/:id` - Product by id
/// - `GET /products/:id/image` - Product image
/// - `GET /images/:name` - Storefront image by name
/// - `POST /recommendations` - Products to advertise next to a cart
/// - `GET /categories` - All categories
/// - `GET /categories/:id` - Category by id
/// - `GET /categories/:id/products?offset&limit` - Page of a category's products
/// - `GET /users/:id` - User profile
/// - `GET /users/:id/orders` - Order history of a user
/// - `GET /stats` - Per-cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cart/add/:pid", post(add_to_cart_handler))
        .route("/cart/remove/:pid", post(remove_from_cart_handler))
        .route("/cart/:pid", put(update_quantity_handler))
        .route("/products/:id", get(product_handler))
        .route("/products/:id/image", get(product_image_handler))
        .route("/images/:name", get(web_image_handler))
        .route("/recommendations", post(recommendations_handler))
        .route("/categories", get(categories_handler))
        .route("/categories/:id", get(category_handler))
        .route("/categories/:id/products", get(category_products_handler))
        .route("/users/:id", get(user_handler))
        .route("/users/:id/orders", get(user_orders_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
