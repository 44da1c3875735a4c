pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for every error response:
/// - `success`: always `false`, mirroring the success envelope
/// - `code`: integer error code for logging/monitoring (e.g., 2002)
/// - `error`: machine-readable error identifier (e.g., "INSUFFICIENT_STOCK")
/// - `message`: human-readable error message
/// - `details`: optional additional error details (e.g., validation errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "success": false,
///   "code": 2002,
///   "error": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock. Available: 100, Requested: 150"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// A 400 carrying a domain-specific error code
    #[error("Rejected ({0}): {1}")]
    Rejected(ErrorCode, String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                // Shape errors report 400, the same as validation failures
                let status = match e.status() {
                    StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
                    other => other,
                };
                (
                    status,
                    ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()),
                )
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                let message = summarize_validation(&e);
                let details = serde_json::to_value(&e).unwrap_or(serde_json::Value::Null);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::ValidationError, message).with_details(details),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::BadRequest, msg),
                )
            }
            AppError::Rejected(code, msg) => {
                tracing::info!(error_code = code.code(), "Request rejected: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(code, msg))
            }
            AppError::NotFound(msg) => {
                tracing::info!(
                    error_code = ErrorCode::NotFound.code(),
                    "Not found: {}",
                    msg
                );
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(ErrorCode::NotFound, msg),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(ErrorCode::InternalError, msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator errors into one readable line, fields in name order.
///
/// Uses each error's message when present, so a missing required field reads
/// like `Product name is required`.
pub fn summarize_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();

    if messages.is_empty() {
        ErrorCode::ValidationError.default_message().to_string()
    } else {
        messages.join("; ")
    }
}

/// Helper function to create error responses.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}
