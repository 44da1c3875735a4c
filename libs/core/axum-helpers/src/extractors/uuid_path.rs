//! UUID path parameter extractor with automatic validation.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// A malformed id is a client error (400), never a lookup miss (404).
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::UuidPath;
///
/// async fn read_one(UuidPath(id): UuidPath) -> String {
///     format!("Product ID: {}", id)
/// }
///
/// let app = Router::new().route("/read-one-product/{id}", get(read_one));
/// ```
#[derive(Debug)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Uuid::parse_str(&id)
            .map(UuidPath)
            .map_err(|_| AppError::BadRequest(format!("Invalid UUID: {}", id)).into_response())
    }
}
