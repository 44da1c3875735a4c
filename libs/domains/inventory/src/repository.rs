use async_trait::async_trait;
use uuid::Uuid;

use crate::error::InventoryResult;
use crate::models::{CreateProduct, ListQuery, Product, UpdateProduct};

/// Atomic stock primitives the stock adjuster is built on.
///
/// Every method is a single store operation scoped to one record. The store
/// serializes concurrent calls for the same product; callers never lock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get a product by ID
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>>;

    /// Add `delta` to `stock_quantity`.
    ///
    /// The only precondition is that the sum fits in an `i64`. Returns `None`
    /// when the product does not exist or the sum would overflow.
    async fn increment_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>>;

    /// Subtract `delta` from `stock_quantity` only if `stock_quantity >= delta`
    /// at the moment the store applies the update.
    ///
    /// Returns `None` when the product does not exist or the precondition did
    /// not hold; the two cases are indistinguishable here.
    async fn decrement_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>>;
}

/// Plain data access for products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product
    async fn create(&self, input: CreateProduct) -> InventoryResult<Product>;

    /// List products ordered by creation time
    async fn list(&self, query: ListQuery) -> InventoryResult<Vec<Product>>;

    /// Apply a partial update in one store operation
    async fn update(&self, id: Uuid, input: UpdateProduct) -> InventoryResult<Option<Product>>;

    /// Delete a product, returning the removed record
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>>;

    /// Products with `stock_quantity < low_stock_threshold`, lowest stock first
    async fn low_stock(&self) -> InventoryResult<Vec<Product>>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> InventoryResult<()>;
}
