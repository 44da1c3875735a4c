use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_inventory::{
    InMemoryProductRepository, LedgerStore, MongoProductRepository, ProductRepository,
    ProductService,
};
use std::future::Future;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;

use config::{Config, StoreConfig};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    match config.store.clone() {
        StoreConfig::Mongodb {
            mongo,
            operation_timeout,
        } => {
            info!("Connecting to MongoDB at {}", mongo.redacted_url());

            let client = database::mongodb::connect_from_config_with_retry(&mongo, None).await?;
            let db = client.database(&mongo.database);

            info!("Successfully connected to MongoDB database: {}", mongo.database);

            let mut repository = MongoProductRepository::new(&db);
            if let Some(timeout) = operation_timeout {
                repository = repository.with_operation_timeout(timeout);
            }
            repository.init_indexes().await?;

            serve(config, repository, async move {
                info!("Shutting down: releasing MongoDB client");
                // Pool closes once the last handle is dropped
                drop(client);
            })
            .await
        }
        StoreConfig::Memory => {
            tracing::warn!("Using the in-memory store; products are lost on restart");
            serve(config, InMemoryProductRepository::new(), async {}).await
        }
    }
}

async fn serve<R, F>(config: Config, repository: R, cleanup: F) -> eyre::Result<()>
where
    R: ProductRepository + LedgerStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let service = ProductService::new(repository);

    let api_routes = api::routes(service);

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    let app = router.merge(health_router(config.app));

    info!(
        store = %config.store.kind(),
        "Starting Inventory API with graceful shutdown ({}s timeout)",
        SHUTDOWN_TIMEOUT.as_secs()
    );

    create_production_app(app, &config.server, SHUTDOWN_TIMEOUT, cleanup)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory API shutdown complete");
    Ok(())
}
