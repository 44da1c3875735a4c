//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::adjuster::StockAdjuster;
use crate::error::{InventoryError, InventoryResult};
use crate::models::{CreateProduct, ListQuery, Product, StockDirection, UpdateProduct};
use crate::repository::{LedgerStore, ProductRepository};

const MAX_LIST_LIMIT: i64 = 1000;

/// Product service providing business logic operations
///
/// CRUD goes straight to the repository after validation. Stock changes go
/// through the [`StockAdjuster`], which shares the same store.
pub struct ProductService<R: ProductRepository + LedgerStore> {
    repository: Arc<R>,
    adjuster: StockAdjuster<R>,
}

impl<R: ProductRepository + LedgerStore> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self {
            adjuster: StockAdjuster::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// Create a new product
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> InventoryResult<Product> {
        let input = input.normalized();
        input.validate()?;

        self.repository.create(input).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> InventoryResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ListQuery) -> InventoryResult<Vec<Product>> {
        let query = ListQuery {
            limit: query.limit.clamp(1, MAX_LIST_LIMIT),
            ..query
        };
        self.repository.list(query).await
    }

    /// Update an existing product
    ///
    /// Applied as one partial write, so a concurrent stock adjustment is never
    /// overwritten by fields the caller did not send.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> InventoryResult<Product> {
        let input = input.normalized();
        input.validate()?;

        if input.is_empty() {
            return Err(InventoryError::Validation(
                "At least one field is required to update a product".to_string(),
            ));
        }

        self.repository
            .update(id, input)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    /// Delete a product, returning the removed record
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> InventoryResult<Product> {
        self.repository
            .delete(id)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    pub async fn adjust_stock(
        &self,
        id: Uuid,
        quantity: i64,
        direction: StockDirection,
    ) -> InventoryResult<Product> {
        self.adjuster.adjust(id, quantity, direction).await
    }

    pub async fn increase_stock(&self, id: Uuid, quantity: i64) -> InventoryResult<Product> {
        self.adjuster.increase(id, quantity).await
    }

    pub async fn decrease_stock(&self, id: Uuid, quantity: i64) -> InventoryResult<Product> {
        self.adjuster.decrease(id, quantity).await
    }

    /// Products below their low-stock threshold, lowest stock first
    #[instrument(skip(self))]
    pub async fn low_stock_products(&self) -> InventoryResult<Vec<Product>> {
        self.repository.low_stock().await
    }

    pub async fn ping(&self) -> InventoryResult<()> {
        self.repository.ping().await
    }
}

impl<R: ProductRepository + LedgerStore> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            adjuster: self.adjuster.clone(),
        }
    }
}
