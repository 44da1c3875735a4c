//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "0.1.0",
        description = "Products and stock levels with atomic stock adjustments",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_inventory::ApiDoc)
    ),
    tags(
        (name = "Products", description = "Product catalogue and stock levels")
    )
)]
pub struct ApiDoc;
