//! Inventory Domain
//!
//! Products with a stock counter, adjusted atomically under concurrent load.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← CRUD validation, delegates stock changes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Adjuster   │  ← One conditional store operation per adjustment
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← LedgerStore + ProductRepository (MongoDB, in-memory)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_inventory::{MongoProductRepository, ProductService, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("inventory");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(ProductService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod adjuster;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use adjuster::StockAdjuster;
pub use error::{InventoryError, InventoryResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryProductRepository;
pub use models::{
    ApiResponse, CreateProduct, DEFAULT_LOW_STOCK_THRESHOLD, ListQuery, Product, StockChange,
    StockDirection, UpdateProduct,
};
pub use self::mongodb::MongoProductRepository;
pub use repository::{LedgerStore, ProductRepository};
pub use service::ProductService;
