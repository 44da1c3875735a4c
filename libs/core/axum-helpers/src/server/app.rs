use super::shutdown::{ShutdownCoordinator, coordinated_shutdown};
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors_layer_from_env, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// Sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar)
/// - API routes nested under `/api`
/// - Tracing, security headers, CORS and compression layers
/// - JSON 404 fallback
///
/// Health endpoints are merged by the app with `health_router()`.
///
/// # CORS
///
/// `CORS_ALLOWED_ORIGIN` takes comma-separated origins, for example
/// `CORS_ALLOWED_ORIGIN=http://localhost:3000,https://example.com`. When it
/// is unset every origin is allowed.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` is set but empty or invalid.
///
/// # Example
/// ```ignore
/// let api_routes = Router::new().nest("/products", handlers::router(service));
/// let router = create_router::<ApiDoc>(api_routes).await?;
/// ```
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer = cors_layer_from_env()?;
    Ok(create_router_with_cors::<T>(apis, cors_layer))
}

/// Same as [`create_router`] with an explicit CORS layer.
pub fn create_router_with_cors<T>(apis: Router, cors_layer: CorsLayer) -> Router
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new())
}

/// Production server with coordinated shutdown and cleanup.
///
/// On SIGINT/SIGTERM the server stops accepting connections, drains in-flight
/// requests, and runs `cleanup` bounded by `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     tracing::info!("Closing store connections");
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        if shutdown_rx.recv().await.is_err() {
            return;
        }

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(coordinator))
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    cleanup_handle.await.ok();

    serve_result
}
