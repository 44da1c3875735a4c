//! MongoDB test infrastructure

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Disposable MongoDB container.
///
/// The container is stopped and removed when this value is dropped, so keep it
/// alive for as long as the test uses the client.
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database("inventory_test");
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
}

impl TestMongo {
    /// Start a MongoDB 7 container and connect to it.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7.0")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::info!(port = host_port, "Test MongoDB ready (mongo 7.0)");

        Self { container, client }
    }

    /// Handle to a database on the test server. Each test should use its own name.
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }
}
