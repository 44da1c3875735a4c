use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::{info, instrument};

use super::MongoConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Error type for MongoDB connection management
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

fn client_options(config: &MongoConfig, mut options: ClientOptions) -> ClientOptions {
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    options
}

/// Round-trip a `ping` through the admin database.
///
/// Unlike `listDatabases` this needs no privileges, so it also works for
/// users scoped to a single database.
pub async fn ping(client: &Client) -> Result<(), MongoError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))
}

/// Build a client from `config` and verify it with a ping.
///
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "inventory");
/// let client = connect_from_config(&config).await?;
/// let db = client.database(&config.database);
/// ```
#[instrument(skip(config), fields(url = %config.redacted_url(), database = %config.database))]
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Connecting to MongoDB");

    let options = client_options(config, ClientOptions::parse(&config.url).await?);
    let client = Client::with_options(options)?;

    ping(&client).await?;

    info!("Connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] with exponential backoff.
///
/// Startup tolerates a database container that is still booting. Passing
/// `None` uses [`RetryConfig::default`].
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    retry_with_backoff(
        || connect_from_config(config),
        retry_config.unwrap_or_default(),
    )
    .await
}
