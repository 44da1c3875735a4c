//! Shared test utilities for the domain crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic names and ids derived from the test name
//!
//! Add `features = ["mongo"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["mongo"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!     let db = mongo.database(&builder.database());
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data seeded from the test name, so reruns see the same values
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_decrease_stock");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Id that no stored record will have
    pub fn unknown_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// Database name unique to this test, e.g. `test_1234`
    pub fn database(&self) -> String {
        format!("test_{}", self.seed)
    }

    /// `test-<prefix>-<seed>-<suffix>`, e.g. `test-product-1234-widget`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.unknown_id(), builder2.unknown_id());
        assert_eq!(builder1.database(), builder2.database());
        assert_eq!(
            builder1.name("product", "widget"),
            builder2.name("product", "widget")
        );
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.unknown_id(), builder2.unknown_id());
        assert_ne!(builder1.database(), builder2.database());
    }
}
