//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_inventory::{LedgerStore, ProductRepository, ProductService};

pub fn router<R: ProductRepository + LedgerStore + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .route("/ready", get(readiness_check::<R>))
        .with_state(service)
}

/// 200 when the store answers a ping, 503 otherwise
async fn readiness_check<R: ProductRepository + LedgerStore>(
    State(service): State<ProductService<R>>,
) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "store",
        Box::pin(async { service.ping().await.map_err(|e| e.to_string()) }),
    )];

    match run_health_checks(checks).await {
        Ok(ready) => ready,
        Err(not_ready) => not_ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use domain_inventory::InMemoryProductRepository;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ready_with_memory_store() {
        let app = router(ProductService::new(InMemoryProductRepository::new()));

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["store"], "connected");
    }
}
