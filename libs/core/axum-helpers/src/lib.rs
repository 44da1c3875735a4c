//! # Axum Helpers
//!
//! Utilities, middleware and helpers shared by the Axum services.
//!
//! ## Modules
//!
//! - **[`server`]**: Server setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use std::time::Duration;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes).await?;
//!
//!     let config = ServerConfig::default();
//!     create_production_app(router, &config, Duration::from_secs(30), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, create_router_with_cors, health_router, run_health_checks, shutdown_signal,
};

pub use http::{
    cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, security_headers,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};
