//! Type-safe error codes for API responses.
//!
//! Each error code includes:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InsufficientStock;
//! assert_eq!(code.as_str(), "INSUFFICIENT_STOCK");
//! assert_eq!(code.code(), 2002);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Request was rejected for a reason described in the message
    BadRequest,

    /// No route accepts this HTTP method
    MethodNotAllowed,

    // Stock errors (2000-2999)
    /// Adjustment quantity is missing, non-numeric or not positive
    InvalidQuantity,

    /// Decrease would take stock below zero
    InsufficientStock,

    // Server errors (5000s)
    /// An unexpected internal server error occurred
    InternalError,
}

impl ErrorCode {
    /// Get the SCREAMING_SNAKE_CASE identifier for client consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InsufficientStock => "INSUFFICIENT_STOCK",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    ///
    /// Ranges:
    /// - 1000-1999: Client errors
    /// - 2000-2999: Stock adjustment errors
    /// - 5000-5999: Server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::BadRequest => 1005,
            Self::MethodNotAllowed => 1006,

            Self::InvalidQuantity => 2001,
            Self::InsufficientStock => 2002,

            Self::InternalError => 5000,
        }
    }

    /// Get the default user-facing error message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InvalidQuantity => "Quantity must be a positive number",
            Self::InsufficientStock => "Insufficient stock",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
