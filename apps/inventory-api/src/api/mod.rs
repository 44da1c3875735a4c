//! API routes module

pub mod health;

use axum::Router;
use domain_inventory::{LedgerStore, ProductRepository, ProductService, handlers};

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes<R: ProductRepository + LedgerStore + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .nest("/products", handlers::router(service.clone()))
        .merge(health::router(service))
}
