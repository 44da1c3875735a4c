use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestStockResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    ApiResponse, CreateProduct, ListQuery, Product, StockChange, StockDirection, UpdateProduct,
};
use crate::repository::{LedgerStore, ProductRepository};
use crate::service::ProductService;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        list_products,
        get_product,
        update_product,
        delete_product,
        increase_stock,
        decrease_stock,
        low_stock_products,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, StockChange, StockDirection),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestStockResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue and stock levels")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<ProductService<R>>>;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + LedgerStore + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/create", post(create_product))
        .route("/read-all-products", get(list_products))
        .route("/read-one-product/{id}", get(get_product))
        .route("/update/{id}", put(update_product))
        .route("/delete/{id}", delete(delete_product))
        .route("/increase/{id}", put(increase_stock))
        .route("/decrease/{id}", put(decrease_stock))
        .route("/low-stock-threshold", get(low_stock_products))
        .with_state(shared_service)
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/create",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> InventoryResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(product).with_message("Product created successfully")),
    ))
}

/// List products, oldest first
#[utoipa::path(
    get,
    path = "/read-all-products",
    tag = "Products",
    params(ListQuery),
    responses(
        (status = 200, description = "Products with their count", body = ApiResponse<Vec<Product>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    Query(query): Query<ListQuery>,
) -> InventoryResult<Json<ApiResponse<Vec<Product>>>> {
    let products = service.list_products(query).await?;
    Ok(Json(ApiResponse::list(products)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/read-one-product/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<Product>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    let product = service.get_product(id).await?;
    Ok(Json(ApiResponse::new(product)))
}

/// Update product fields. Absent fields keep their stored value.
#[utoipa::path(
    put,
    path = "/update/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(
        ApiResponse::new(product).with_message("Product updated successfully"),
    ))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted, returns the removed record", body = ApiResponse<Product>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    let product = service.delete_product(id).await?;
    Ok(Json(
        ApiResponse::new(product).with_message("Product deleted successfully"),
    ))
}

/// Add units to a product's stock
#[utoipa::path(
    put,
    path = "/increase/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = StockChange,
    responses(
        (status = 200, description = "Stock increased", body = ApiResponse<Product>),
        (status = 400, response = BadRequestStockResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn increase_stock<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
    body: Result<Json<StockChange>, JsonRejection>,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    adjust(&service, id, StockDirection::Increase, body).await
}

/// Remove units from a product's stock.
///
/// Rejected with 400 when the stock on hand is lower than the requested
/// quantity; the record is left untouched.
#[utoipa::path(
    put,
    path = "/decrease/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = StockChange,
    responses(
        (status = 200, description = "Stock decreased", body = ApiResponse<Product>),
        (status = 400, response = BadRequestStockResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn decrease_stock<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
    body: Result<Json<StockChange>, JsonRejection>,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    adjust(&service, id, StockDirection::Decrease, body).await
}

/// Products whose stock is below their threshold, lowest stock first
#[utoipa::path(
    get,
    path = "/low-stock-threshold",
    tag = "Products",
    responses(
        (status = 200, description = "Low stock products with their count", body = ApiResponse<Vec<Product>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn low_stock_products<R: ProductRepository + LedgerStore>(
    State(service): SharedService<R>,
) -> InventoryResult<Json<ApiResponse<Vec<Product>>>> {
    let products = service.low_stock_products().await?;
    Ok(Json(ApiResponse::list(products)))
}

async fn adjust<R: ProductRepository + LedgerStore>(
    service: &ProductService<R>,
    id: Uuid,
    direction: StockDirection,
    body: Result<Json<StockChange>, JsonRejection>,
) -> InventoryResult<Json<ApiResponse<Product>>> {
    // Any unreadable body counts as a bad quantity
    let quantity = match body {
        Ok(Json(change)) => change.quantity()?,
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable stock change body");
            return Err(InventoryError::InvalidQuantity);
        }
    };

    let product = service.adjust_stock(id, quantity, direction).await?;
    let message = format!("Stock {} by {}", direction.verb(), quantity);

    Ok(Json(ApiResponse::new(product).with_message(message)))
}
