//! Stock adjuster
//!
//! Each adjustment is exactly one conditional store operation. A rejected
//! adjustment costs one extra read, used only to tell the caller why it was
//! rejected. The read never feeds back into a write.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Product, StockDirection};
use crate::repository::LedgerStore;

pub struct StockAdjuster<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> StockAdjuster<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply `delta` units in `direction` to the product's stock.
    ///
    /// Non-positive deltas fail with `InvalidQuantity` before the store is
    /// touched. Nothing is retried: an insufficient balance is a final answer.
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        id: Uuid,
        delta: i64,
        direction: StockDirection,
    ) -> InventoryResult<Product> {
        if delta <= 0 {
            return Err(InventoryError::InvalidQuantity);
        }

        let applied = match direction {
            StockDirection::Increase => self.store.increment_stock(id, delta).await?,
            StockDirection::Decrease => self.store.decrement_stock(id, delta).await?,
        };
        let Some(product) = applied else {
            return Err(self.classify_rejected(id, delta, direction).await);
        };

        tracing::info!(
            product_id = %id,
            delta,
            stock_quantity = product.stock_quantity,
            "Stock {}",
            direction.verb()
        );
        Ok(product)
    }

    pub async fn increase(&self, id: Uuid, delta: i64) -> InventoryResult<Product> {
        self.adjust(id, delta, StockDirection::Increase).await
    }

    pub async fn decrease(&self, id: Uuid, delta: i64) -> InventoryResult<Product> {
        self.adjust(id, delta, StockDirection::Decrease).await
    }

    /// Work out why a conditional update matched nothing.
    async fn classify_rejected(
        &self,
        id: Uuid,
        requested: i64,
        direction: StockDirection,
    ) -> InventoryError {
        let product = match self.store.find_by_id(id).await {
            Ok(Some(product)) => product,
            Ok(None) => return InventoryError::NotFound(id),
            Err(err) => return err,
        };

        // Stock may have moved since the rejection; report what we saw.
        tracing::debug!(
            product_id = %id,
            available = product.stock_quantity,
            requested,
            "Stock {} rejected",
            direction
        );
        match direction {
            StockDirection::Increase => InventoryError::Validation(format!(
                "Increasing stock by {requested} would overflow"
            )),
            StockDirection::Decrease => InventoryError::InsufficientStock {
                available: product.stock_quantity,
                requested,
            },
        }
    }
}

impl<S: LedgerStore> Clone for StockAdjuster<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use crate::repository::MockLedgerStore;
    use mockall::predicate::eq;

    fn product_with_stock(id: Uuid, stock_quantity: i64) -> Product {
        let mut product = Product::new(CreateProduct {
            name: Some("TestProd".into()),
            description: Some("A test product".into()),
            stock_quantity: Some(stock_quantity),
            low_stock_threshold: Some(20),
        });
        product.id = id;
        product
    }

    fn adjuster(store: MockLedgerStore) -> StockAdjuster<MockLedgerStore> {
        StockAdjuster::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_non_positive_delta_never_reaches_store() {
        // No expectations: any store call would panic.
        let adjuster = adjuster(MockLedgerStore::new());
        let id = Uuid::now_v7();

        for delta in [0, -1, -10] {
            for direction in [StockDirection::Increase, StockDirection::Decrease] {
                let result = adjuster.adjust(id, delta, direction).await;
                assert!(matches!(result, Err(InventoryError::InvalidQuantity)));
            }
        }
    }

    #[tokio::test]
    async fn test_increase_is_single_store_call() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store
            .expect_increment_stock()
            .with(eq(id), eq(50))
            .times(1)
            .returning(move |id, _| Ok(Some(product_with_stock(id, 150))));

        let product = adjuster(store).increase(id, 50).await.unwrap();
        assert_eq!(product.stock_quantity, 150);
    }

    #[tokio::test]
    async fn test_increase_missing_product_is_not_found() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store.expect_increment_stock().returning(|_, _| Ok(None));
        store
            .expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        let result = adjuster(store).increase(id, 10).await;
        assert!(matches!(result, Err(InventoryError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_rejected_increase_on_existing_product_is_overflow() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store.expect_increment_stock().returning(|_, _| Ok(None));
        store
            .expect_find_by_id()
            .times(1)
            .returning(move |id| Ok(Some(product_with_stock(id, i64::MAX - 1))));

        let result = adjuster(store).increase(id, 5).await;
        match result {
            Err(InventoryError::Validation(message)) => {
                assert_eq!(message, "Increasing stock by 5 would overflow");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_increase_success_skips_follow_up_read() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store
            .expect_increment_stock()
            .returning(move |id, _| Ok(Some(product_with_stock(id, 10))));
        store.expect_find_by_id().never();

        assert!(adjuster(store).increase(id, 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_decrease_success_skips_follow_up_read() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store
            .expect_decrement_stock()
            .with(eq(id), eq(30))
            .times(1)
            .returning(move |id, _| Ok(Some(product_with_stock(id, 70))));
        store.expect_find_by_id().never();

        let product = adjuster(store).decrease(id, 30).await.unwrap();
        assert_eq!(product.stock_quantity, 70);
    }

    #[tokio::test]
    async fn test_rejected_decrease_reports_available_and_requested() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store.expect_decrement_stock().returning(|_, _| Ok(None));
        store
            .expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |id| Ok(Some(product_with_stock(id, 100))));

        let result = adjuster(store).decrease(id, 150).await;
        match result {
            Err(InventoryError::InsufficientStock {
                available,
                requested,
            }) => {
                assert_eq!(available, 100);
                assert_eq!(requested, 150);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_decrease_on_missing_product_is_not_found() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store.expect_decrement_stock().returning(|_, _| Ok(None));
        store.expect_find_by_id().returning(|_| Ok(None));

        let result = adjuster(store).decrease(id, 10).await;
        assert!(matches!(result, Err(InventoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced_unchanged() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store
            .expect_decrement_stock()
            .returning(|_, _| Err(InventoryError::StoreUnavailable("timed out".into())));

        let result = adjuster(store).decrease(id, 10).await;
        assert!(matches!(result, Err(InventoryError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_failed_classification_read_is_surfaced() {
        let id = Uuid::now_v7();
        let mut store = MockLedgerStore::new();
        store.expect_decrement_stock().returning(|_, _| Ok(None));
        store
            .expect_find_by_id()
            .returning(|_| Err(InventoryError::Database("connection reset".into())));

        let result = adjuster(store).decrease(id, 10).await;
        assert!(matches!(result, Err(InventoryError::Database(_))));
    }
}
