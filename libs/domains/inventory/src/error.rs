use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product with id {0} not found")]
    NotFound(Uuid),

    #[error("Quantity must be a positive number")]
    InvalidQuantity,

    #[error("Insufficient stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    /// Whether this error is a system fault rather than a business outcome
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            InventoryError::StoreUnavailable(_)
                | InventoryError::Database(_)
                | InventoryError::Internal(_)
        )
    }
}

/// Convert InventoryError to AppError for standardized error responses.
///
/// Faults are logged with their detail here and reach the client only as the
/// generic internal error message.
impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            InventoryError::InvalidQuantity => {
                AppError::Rejected(ErrorCode::InvalidQuantity, err.to_string())
            }
            InventoryError::InsufficientStock { .. } => {
                AppError::Rejected(ErrorCode::InsufficientStock, err.to_string())
            }
            InventoryError::Validation(msg) => {
                AppError::Rejected(ErrorCode::ValidationError, msg)
            }
            InventoryError::StoreUnavailable(_)
            | InventoryError::Database(_)
            | InventoryError::Internal(_) => {
                tracing::error!(error = %err, "Inventory store failure");
                AppError::InternalServerError(
                    ErrorCode::InternalError.default_message().to_string(),
                )
            }
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for InventoryError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Io(_) => InventoryError::StoreUnavailable(err.to_string()),
            _ => InventoryError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for InventoryError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        InventoryError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for InventoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        InventoryError::Validation(axum_helpers::errors::summarize_validation(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_insufficient_stock_message_is_verbatim() {
        let err = InventoryError::InsufficientStock {
            available: 100,
            requested: 150,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock. Available: 100, Requested: 150"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InventoryError::InvalidQuantity, StatusCode::BAD_REQUEST),
            (InventoryError::NotFound(Uuid::now_v7()), StatusCode::NOT_FOUND),
            (
                InventoryError::InsufficientStock {
                    available: 1,
                    requested: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::Validation("Product name is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::StoreUnavailable("timed out".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                InventoryError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_faults_are_classified() {
        assert!(InventoryError::Database("x".into()).is_fault());
        assert!(InventoryError::StoreUnavailable("x".into()).is_fault());
        assert!(!InventoryError::InvalidQuantity.is_fault());
        assert!(!InventoryError::NotFound(Uuid::now_v7()).is_fault());
    }
}
