//! In-memory implementation of the product stores
//!
//! Intended for tests and local development. Each conditional update runs
//! inside a single write-lock critical section that re-checks its precondition.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{CreateProduct, ListQuery, Product, UpdateProduct};
use crate::repository::{LedgerStore, ProductRepository};

#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> InventoryResult<RwLockReadGuard<'_, HashMap<Uuid, Product>>> {
        self.products
            .read()
            .map_err(|_| InventoryError::Internal("lock poisoned".to_string()))
    }

    fn write(&self) -> InventoryResult<RwLockWriteGuard<'_, HashMap<Uuid, Product>>> {
        self.products
            .write()
            .map_err(|_| InventoryError::Internal("lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        Ok(self.read()?.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn increment_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>> {
        let mut products = self.write()?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        let Some(stock_quantity) = product.stock_quantity.checked_add(delta) else {
            return Ok(None);
        };

        product.stock_quantity = stock_quantity;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    #[instrument(skip(self))]
    async fn decrement_stock(&self, id: Uuid, delta: i64) -> InventoryResult<Option<Product>> {
        let mut products = self.write()?;
        match products.get_mut(&id) {
            Some(product) if product.stock_quantity >= delta => {
                product.stock_quantity -= delta;
                product.updated_at = Utc::now();
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self, input))]
    async fn create(&self, input: CreateProduct) -> InventoryResult<Product> {
        let product = Product::new(input);
        self.write()?.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    async fn list(&self, query: ListQuery) -> InventoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self.read()?.values().cloned().collect();
        products.sort_by_key(|p| p.id);

        let limit = usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX);
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        Ok(products.into_iter().skip(offset).take(limit).collect())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> InventoryResult<Option<Product>> {
        let mut products = self.write()?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };

        product.apply_update(input);
        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(Some(product.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        let removed = self.write()?.remove(&id);
        if removed.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(removed)
    }

    async fn low_stock(&self) -> InventoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .read()?
            .values()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            a.stock_quantity
                .cmp(&b.stock_quantity)
                .then(a.id.cmp(&b.id))
        });
        Ok(products)
    }

    async fn ping(&self) -> InventoryResult<()> {
        self.read().map(|_| ())
    }
}
