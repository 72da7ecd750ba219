//! API Handlers
//!
//! HTTP request handlers for the cart and catalog endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::availability::{AlwaysUp, Availability, AvailabilitySimulator};
use crate::cache::CacheRegistry;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, ImageResponse, PageQuery, QuantityQuery, StatsResponse};
use crate::remote::{Category, Order, Product, RemoteData, User};
use crate::services::{CartService, CatalogService};
use crate::session::{SessionPayload, SessionSigner};

/// Application state shared across all handlers.
///
/// Every service draws its caches from the one registry held here.
#[derive(Clone)]
pub struct AppState {
    pub registry: CacheRegistry,
    pub availability: Arc<dyn Availability>,
    pub clock: Arc<dyn Clock>,
    pub cart: Arc<CartService>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    /// Wires the services against an explicit clock, health gate and remote.
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        availability: Arc<dyn Availability>,
        remote: Arc<dyn RemoteData>,
    ) -> Result<Self> {
        let registry = CacheRegistry::new(Arc::clone(&clock));
        let signer = SessionSigner::new(config.session_secret.as_bytes())?;

        let cart = CartService::new(
            &registry,
            Arc::clone(&availability),
            Arc::clone(&remote),
            signer,
            config,
        )?;
        let catalog = CatalogService::new(&registry, Arc::clone(&availability), remote, config)?;

        Ok(Self {
            registry,
            availability,
            clock,
            cart: Arc::new(cart),
            catalog: Arc::new(catalog),
        })
    }

    /// Creates the production state: wall clock, and the outage simulator
    /// only when `failure_seconds` is non-zero.
    pub fn from_config(config: &Config, remote: Arc<dyn RemoteData>) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let availability: Arc<dyn Availability> = if config.failure_seconds == 0 {
            Arc::new(AlwaysUp)
        } else {
            Arc::new(AvailabilitySimulator::new(
                config.failure_seconds,
                Arc::clone(&clock),
            )?)
        };
        Self::new(config, clock, availability, remote)
    }
}

// == Cart ==

/// Handler for POST /cart/add/:pid
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
    Json(payload): Json<SessionPayload>,
) -> Result<Json<SessionPayload>> {
    let payload = state.cart.add_product(payload, pid).await?;
    Ok(Json(payload))
}

/// Handler for POST /cart/remove/:pid
pub async fn remove_from_cart_handler(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
    Json(payload): Json<SessionPayload>,
) -> Result<Json<SessionPayload>> {
    let payload = state.cart.remove_product(payload, pid).await?;
    Ok(Json(payload))
}

/// Handler for PUT /cart/:pid?quantity=N
pub async fn update_quantity_handler(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
    Query(query): Query<QuantityQuery>,
    Json(payload): Json<SessionPayload>,
) -> Result<Json<SessionPayload>> {
    let payload = state
        .cart
        .update_quantity(payload, pid, query.quantity)
        .await?;
    Ok(Json(payload))
}

// == Catalog ==

/// Handler for GET /products/:id
pub async fn product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.product(id).await?))
}

/// Handler for GET /categories
pub async fn categories_handler(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog.categories().await?))
}

/// Handler for GET /categories/:id
pub async fn category_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>> {
    Ok(Json(state.catalog.category(id).await?))
}

/// Handler for GET /categories/:id/products
///
/// Without paging parameters the whole category is returned.
pub async fn category_products_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog
        .category_products(id, page.offset, page.limit)
        .await?;
    Ok(Json(products))
}

/// Handler for GET /products/:id/image
pub async fn product_image_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ImageResponse>> {
    let data = state.catalog.product_image(id).await?;
    Ok(Json(ImageResponse { data }))
}

/// Handler for GET /images/:name
pub async fn web_image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ImageResponse>> {
    let data = state.catalog.web_image(&name).await?;
    Ok(Json(ImageResponse { data }))
}

/// Handler for POST /recommendations
///
/// Takes the session cart and returns the products to advertise beside it.
/// The session is not modified, so its tag is not checked.
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Json(payload): Json<SessionPayload>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog.recommendations(&payload).await?))
}

/// Handler for GET /users/:id
pub async fn user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>> {
    Ok(Json(state.catalog.user(id).await?))
}

/// Handler for GET /users/:id/orders
pub async fn user_orders_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.catalog.orders(id).await?))
}

// == Diagnostics ==

/// Handler for GET /stats
///
/// Returns per-cache statistics from the registry. Never gated by the
/// availability simulator.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.availability.is_down(),
        state.registry.snapshot(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.clock.now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ServiceError;
    use crate::remote::InMemoryCatalog;

    fn test_state() -> AppState {
        AppState::new(
            &Config::default(),
            Arc::new(ManualClock::at_millis(0)),
            Arc::new(AlwaysUp),
            Arc::new(InMemoryCatalog::demo()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_cart_add_update_remove() {
        let state = test_state();

        let Json(payload) = add_to_cart_handler(
            State(state.clone()),
            Path(5),
            Json(SessionPayload::anonymous()),
        )
        .await
        .unwrap();
        assert_eq!(payload.items[0].unit_price_minor_units, 380);

        let Json(payload) = update_quantity_handler(
            State(state.clone()),
            Path(5),
            Query(QuantityQuery { quantity: 3 }),
            Json(payload),
        )
        .await
        .unwrap();
        assert_eq!(payload.total_minor_units(), 1_140);

        let Json(payload) = remove_from_cart_handler(State(state.clone()), Path(5), Json(payload))
            .await
            .unwrap();
        assert!(payload.items.is_empty());
        assert!(state.cart.signer().verify(&payload));
    }

    #[tokio::test]
    async fn test_product_handler_not_found() {
        let state = test_state();

        let result = product_handler(State(state), Path(999)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_products_handler_defaults_to_all() {
        let state = test_state();

        let Json(products) =
            category_products_handler(State(state), Path(3), Query(PageQuery::default()))
                .await
                .unwrap();
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_image_handlers() {
        let state = test_state();

        let Json(image) = product_image_handler(State(state.clone()), Path(7))
            .await
            .unwrap();
        assert!(image.data.contains("Peppermint"));

        let result = web_image_handler(State(state), Path("banner".to_string())).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recommendations_handler() {
        let state = test_state();
        let payload = state
            .cart
            .add_product(SessionPayload::anonymous(), 6)
            .await
            .unwrap();

        let Json(products) = recommendations_handler(State(state), Json(payload))
            .await
            .unwrap();
        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 1, 2]);
    }

    #[tokio::test]
    async fn test_stats_handler_lists_caches() {
        let state = test_state();
        user_handler(State(state.clone()), Path(1)).await.unwrap();

        let Json(stats) = stats_handler(State(state)).await;
        assert!(!stats.down);
        assert_eq!(stats.caches["catalog/userCache"].misses, 1);
        assert!(stats.caches.contains_key("cart/productCache"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health_handler(State(test_state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.timestamp, "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_from_config_rejects_bad_failure_seconds() {
        let config = Config {
            failure_seconds: 12,
            ..Config::default()
        };
        let result = AppState::from_config(&config, Arc::new(InMemoryCatalog::demo()));
        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
    }
}
