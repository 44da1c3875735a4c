use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{InventoryError, InventoryResult};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 20;
const DESCRIPTION_MAX_CHARS: usize = 50;

/// Direction of a stock adjustment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockDirection {
    Increase,
    Decrease,
}

impl StockDirection {
    /// Past-tense verb used in response messages
    pub fn verb(&self) -> &'static str {
        match self {
            StockDirection::Increase => "increased",
            StockDirection::Decrease => "decreased",
        }
    }
}

/// Product entity - one stock counter per product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Units on hand, never negative
    pub stock_quantity: i64,
    /// Products strictly below this level are reported as low stock
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        required(message = "Product name is required"),
        custom(function = "validate_name")
    )]
    #[schema(example = "Widget")]
    pub name: Option<String>,
    #[validate(
        required(message = "Product description is required"),
        custom(function = "validate_description")
    )]
    #[schema(example = "A small widget")]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: Option<i64>,
    #[validate(range(min = 0, message = "Threshold cannot be negative"))]
    pub low_stock_threshold: Option<i64>,
}

/// DTO for updating an existing product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: Option<i64>,
    #[validate(range(min = 0, message = "Threshold cannot be negative"))]
    pub low_stock_threshold: Option<i64>,
}

/// Stock adjustment request body
///
/// `quantity` is kept as raw JSON so that missing, fractional and
/// non-numeric values all surface as the same invalid-quantity error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StockChange {
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 50)]
    pub quantity: Option<serde_json::Value>,
}

/// Pagination for the product listing
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

/// Success envelope shared by every products endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

fn default_limit() -> i64 {
    100
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn length_error(message: &'static str) -> ValidationError {
    ValidationError::new("length").with_message(Cow::Borrowed(message))
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let chars = name.trim().chars().count();
    if chars == 0 {
        return Err(length_error("Product name is required"));
    }
    if chars < NAME_MIN_CHARS {
        return Err(length_error("Product name must be at least 3 characters"));
    }
    if chars > NAME_MAX_CHARS {
        return Err(length_error(
            "Product name cannot be greater than 20 characters",
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    let chars = description.trim().chars().count();
    if chars == 0 {
        return Err(length_error("Product description is required"));
    }
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(length_error(
            "Product description cannot be greater than 50 characters",
        ));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl CreateProduct {
    /// Trim string fields the way the stored record keeps them
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            ..self
        }
    }
}

impl UpdateProduct {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl StockChange {
    /// Integer quantity carried by the request.
    ///
    /// Sign is not checked here; the adjuster rejects non-positive deltas.
    pub fn quantity(&self) -> InventoryResult<i64> {
        let Some(serde_json::Value::Number(number)) = self.quantity.as_ref() else {
            return Err(InventoryError::InvalidQuantity);
        };

        if let Some(quantity) = number.as_i64() {
            return Ok(quantity);
        }
        // Integers past i64 arrive as u64 and must not be clamped
        if number.is_u64() {
            return Err(InventoryError::InvalidQuantity);
        }

        // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
            .ok_or(InventoryError::InvalidQuantity)
    }
}

impl Product {
    /// Create a new product from a validated CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            stock_quantity: input.stock_quantity.unwrap_or(0),
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from UpdateProduct DTO
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(stock_quantity) = update.stock_quantity {
            self.stock_quantity = stock_quantity;
        }
        if let Some(low_stock_threshold) = update.low_stock_threshold {
            self.low_stock_threshold = low_stock_threshold;
        }
        self.updated_at = Utc::now();
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < self.low_stock_threshold
    }
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List envelope carrying the number of returned items
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            message: None,
            count: Some(data.len()),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(name: &str, description: &str) -> CreateProduct {
        CreateProduct {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_product_applies_defaults() {
        let product = Product::new(create("Widget", "A widget"));
        assert_eq!(product.stock_quantity, 0);
        assert_eq!(product.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_create_requires_name_and_description() {
        let errors = CreateProduct::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_name_length_bounds() {
        assert!(create("ab", "ok").validate().is_err());
        assert!(create("abc", "ok").validate().is_ok());
        assert!(create(&"a".repeat(20), "ok").validate().is_ok());
        assert!(create(&"a".repeat(21), "ok").validate().is_err());
    }

    #[test]
    fn test_name_is_measured_after_trim() {
        assert!(create("  ab  ", "ok").validate().is_err());
    }

    #[test]
    fn test_description_length_bounds() {
        assert!(create("Widget", "   ").validate().is_err());
        assert!(create("Widget", &"d".repeat(50)).validate().is_ok());
        assert!(create("Widget", &"d".repeat(51)).validate().is_err());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let input = CreateProduct {
            stock_quantity: Some(-5),
            ..create("BadProd", "Negative stock")
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_normalized_trims_strings() {
        let input = create("  Widget ", " A widget ").normalized();
        assert_eq!(input.name.as_deref(), Some("Widget"));
        assert_eq!(input.description.as_deref(), Some("A widget"));
    }

    #[test]
    fn test_stock_change_accepts_integers() {
        let change = StockChange {
            quantity: Some(json!(50)),
        };
        assert_eq!(change.quantity().unwrap(), 50);

        let change = StockChange {
            quantity: Some(json!(-10)),
        };
        assert_eq!(change.quantity().unwrap(), -10);

        let change = StockChange {
            quantity: Some(json!(3.0)),
        };
        assert_eq!(change.quantity().unwrap(), 3);
    }

    #[test]
    fn test_stock_change_rejects_non_integers() {
        for value in [
            None,
            Some(json!("ten")),
            Some(json!(1.5)),
            Some(json!(null)),
            Some(json!(9_223_372_036_854_775_808_u64)),
            Some(json!(u64::MAX)),
            Some(json!(9.3e18)),
            Some(json!(1e300)),
        ] {
            let change = StockChange { quantity: value };
            assert!(matches!(
                change.quantity(),
                Err(InventoryError::InvalidQuantity)
            ));
        }
    }

    #[test]
    fn test_apply_update_only_touches_present_fields() {
        let mut product = Product::new(create("Widget", "A widget"));
        product.apply_update(UpdateProduct {
            stock_quantity: Some(75),
            ..Default::default()
        });
        assert_eq!(product.name, "Widget");
        assert_eq!(product.stock_quantity, 75);
    }

    #[test]
    fn test_list_envelope_counts_items() {
        let response = ApiResponse::list(vec![1, 2, 3]);
        assert!(response.success);
        assert_eq!(response.count, Some(3));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(StockDirection::Increase.to_string(), "increase");
        assert_eq!(StockDirection::Decrease.verb(), "decreased");
    }
}
