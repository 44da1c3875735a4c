//! MongoDB store tests. They start a container, so run them with
//! `cargo test -p domain_inventory --test mongo_test -- --ignored`.

use domain_inventory::{
    CreateProduct, InventoryError, LedgerStore, ListQuery, MongoProductRepository,
    ProductRepository, ProductService, UpdateProduct,
};
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestMongo};

async fn repository(mongo: &TestMongo, test_name: &str) -> MongoProductRepository {
    let builder = TestDataBuilder::from_test_name(test_name);
    let repository = MongoProductRepository::new(&mongo.database(&builder.database()));
    repository.init_indexes().await.unwrap();
    repository
}

fn product(name: &str, stock: i64, threshold: i64) -> CreateProduct {
    CreateProduct {
        name: Some(name.to_string()),
        description: Some(format!("{name} description")),
        stock_quantity: Some(stock),
        low_stock_threshold: Some(threshold),
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_find_round_trips_binary_id() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_create_and_find_round_trips_binary_id").await;

    let created = repo.create(product("Widget", 12, 5)).await.unwrap();
    let found = repo.find_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.name, "Widget");
    assert_eq!(found.stock_quantity, 12);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_conditional_decrement() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_conditional_decrement").await;
    let created = repo.create(product("Widget", 100, 20)).await.unwrap();

    let updated = repo.decrement_stock(created.id, 60).await.unwrap().unwrap();
    assert_eq!(updated.stock_quantity, 40);

    assert!(repo.decrement_stock(created.id, 41).await.unwrap().is_none());

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 40);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_increment_past_i64_max_is_rejected() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_increment_past_i64_max_is_rejected").await;
    let created = repo.create(product("Huge", i64::MAX - 1, 5)).await.unwrap();

    let service = ProductService::new(repo);
    let result = service.increase_stock(created.id, 5).await;
    assert!(matches!(result, Err(InventoryError::Validation(_))));

    let stored = service.get_product(created.id).await.unwrap();
    assert_eq!(stored.stock_quantity, i64::MAX - 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_missing_product_is_none() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_missing_product_is_none").await;
    let unknown = TestDataBuilder::from_test_name("test_missing_product_is_none").unknown_id();

    assert!(repo.increment_stock(unknown, 1).await.unwrap().is_none());
    assert!(repo.decrement_stock(unknown, 1).await.unwrap().is_none());
    assert!(repo.delete(unknown).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_decreases_never_oversell() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_concurrent_decreases_never_oversell").await;
    let created = repo.create(product("Widget", 100, 20)).await.unwrap();

    let service = Arc::new(ProductService::new(repo));
    let handles: Vec<_> = (0..50)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.decrease_stock(created.id, 7).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(product) => {
                assert!(product.stock_quantity >= 0);
                succeeded += 1;
            }
            Err(InventoryError::InsufficientStock { requested, .. }) => {
                assert_eq!(requested, 7);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 14);
    let stored = service.get_product(created.id).await.unwrap();
    assert_eq!(stored.stock_quantity, 2);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_low_stock_and_listing_order() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_low_stock_and_listing_order").await;

    repo.create(product("Plenty", 100, 20)).await.unwrap();
    repo.create(product("Low", 5, 10)).await.unwrap();
    repo.create(product("Lower", 1, 10)).await.unwrap();

    let low: Vec<_> = repo
        .low_stock()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(low, ["Lower", "Low"]);

    let all: Vec<_> = repo
        .list(ListQuery::default())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(all, ["Plenty", "Low", "Lower"]);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_partial_update_keeps_stock() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_partial_update_keeps_stock").await;
    let created = repo.create(product("Widget", 100, 20)).await.unwrap();

    repo.increment_stock(created.id, 5).await.unwrap();
    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.stock_quantity, 105);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_ping() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_ping").await;

    repo.ping().await.unwrap();
}
