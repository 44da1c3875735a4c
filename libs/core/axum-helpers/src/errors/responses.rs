//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "code": 5000,
        "error": "INTERNAL_ERROR",
        "message": "An internal server error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Product name is required"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid UUID",
    content_type = "application/json",
    example = json!({
        "success": false,
        "code": 1005,
        "error": "BAD_REQUEST",
        "message": "Invalid UUID: not-a-uuid"
    })
)]
pub struct BadRequestUuidResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Stock adjustment rejected",
    content_type = "application/json",
    example = json!({
        "success": false,
        "code": 2002,
        "error": "INSUFFICIENT_STOCK",
        "message": "Insufficient stock. Available: 100, Requested: 150"
    })
)]
pub struct BadRequestStockResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "success": false,
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "Resource not found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);
