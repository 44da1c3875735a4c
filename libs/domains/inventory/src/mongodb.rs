//! MongoDB implementation of the product stores
//!
//! Stock adjustments are single `find_one_and_update` calls. The decrement
//! precondition lives in the filter, so the server applies it atomically.

use std::future::IntoFuture;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, spec::BinarySubtype, Binary, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{CreateProduct, ListQuery, Product, UpdateProduct};
use crate::repository::{LedgerStore, ProductRepository};

pub const DEFAULT_COLLECTION: &str = "products";

/// MongoDB implementation of `LedgerStore` and `ProductRepository`
pub struct MongoProductRepository {
    db: Database,
    collection: Collection<Product>,
    operation_timeout: Option<Duration>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    /// Create a repository over a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection::<Product>(collection_name),
            operation_timeout: None,
        }
    }

    /// Bound every store call. An elapsed call surfaces as `StoreUnavailable`.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Initialize the index behind the low-stock query.
    ///
    /// Listings sort on `_id`: ids are UUIDv7, so that order is creation order.
    /// The stored `created_at` string has variable-width fractional seconds and
    /// does not sort reliably.
    pub async fn init_indexes(&self) -> InventoryResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "stock_quantity": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_stock_quantity".to_string())
                        .build(),
                )
                .build(),
        ];

        self.timed("create_indexes", self.collection.create_indexes(indexes))
            .await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    async fn timed<T, F>(&self, operation: &'static str, action: F) -> InventoryResult<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        let future = action.into_future();
        match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| {
                    InventoryError::StoreUnavailable(format!(
                        "{operation} timed out after {}ms",
                        limit.as_millis()
                    ))
                })?
                .map_err(InventoryError::from),
            None => future.await.map_err(InventoryError::from),
        }
    }

    /// Stored form of a product id. The driver writes `Uuid` as generic binary.
    fn id_bson(id: Uuid) -> Bson {
        Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: id.as_bytes().to_vec(),
        })
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": Self::id_bson(id) }
    }

    /// Timestamp in the same string form serde gives `DateTime<Utc>`
    fn now_bson() -> Bson {
        Bson::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    /// Build the `$set` document for a partial update
    fn build_update(input: &UpdateProduct) -> Document {
        let mut set = doc! { "updated_at": Self::now_bson() };

        if let Some(ref name) = input.name {
            set.insert("name", name);
        }
        if let Some(ref description) = input.description {
            set.insert("description", description);
        }
        if let Some(stock_quantity) = input.stock_quantity {
            set.insert("stock_quantity", stock_quantity);
        }
        if let Some(low_stock_threshold) = input.low_stock_threshold {
            set.insert("low_stock_threshold", low_stock_threshold);
        }

        doc! { "$set": set }
    }

    /// Matches only while the sum still fits in an i64
    fn increment_filter(id: Uuid, delta: i64) -> Document {
        doc! {
            "_id": Self::id_bson(id),
            "stock_quantity": { "$lte": i64::MAX.saturating_sub(delta) },
        }
    }

    fn decrement_filter(id: Uuid, delta: i64) -> Document {
        doc! {
            "_id": Self::id_bson(id),
            "stock_quantity": { "$gte": delta },
        }
    }

    fn low_stock_filter() -> Document {
        doc! { "$expr": { "$lt": ["$stock_quantity", "$low_stock_threshold"] } }
    }
}

#[async_trait]
impl LedgerStore for MongoProductRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        self.timed("find_by_id", self.collection.find_one(Self::id_filter(id)))
            .await
    }

    #[instrument(skip(self))]
    async fn increment_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>> {
        let update = doc! {
            "$inc": { "stock_quantity": delta },
            "$set": { "updated_at": Self::now_bson() },
        };

        self.timed(
            "increment_stock",
            self.collection
                .find_one_and_update(Self::increment_filter(id, delta), update)
                .with_options(Self::return_updated()),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn decrement_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>> {
        let update = doc! {
            "$inc": { "stock_quantity": -delta },
            "$set": { "updated_at": Self::now_bson() },
        };

        self.timed(
            "decrement_stock",
            self.collection
                .find_one_and_update(Self::decrement_filter(id, delta), update)
                .with_options(Self::return_updated()),
        )
        .await
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input))]
    async fn create(&self, input: CreateProduct) -> InventoryResult<Product> {
        let product = Product::new(input);

        self.timed("create", self.collection.insert_one(&product))
            .await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: ListQuery) -> InventoryResult<Vec<Product>> {
        let options = FindOptions::builder()
            .limit(query.limit)
            .skip(query.offset)
            .sort(doc! { "_id": 1 })
            .build();

        self.timed("list", async {
            let cursor = self.collection.find(doc! {}).with_options(options).await?;
            cursor.try_collect::<Vec<Product>>().await
        })
        .await
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> InventoryResult<Option<Product>> {
        let update = Self::build_update(&input);

        let product = self
            .timed(
                "update",
                self.collection
                    .find_one_and_update(Self::id_filter(id), update)
                    .with_options(Self::return_updated()),
            )
            .await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        let product = self
            .timed(
                "delete",
                self.collection.find_one_and_delete(Self::id_filter(id)),
            )
            .await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn low_stock(&self) -> InventoryResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "stock_quantity": 1, "_id": 1 })
            .build();

        self.timed("low_stock", async {
            let cursor = self
                .collection
                .find(Self::low_stock_filter())
                .with_options(options)
                .await?;
            cursor.try_collect::<Vec<Product>>().await
        })
        .await
    }

    async fn ping(&self) -> InventoryResult<()> {
        self.timed("ping", self.db.run_command(doc! { "ping": 1 }))
            .await
            .map(|_| ())
    }
}
