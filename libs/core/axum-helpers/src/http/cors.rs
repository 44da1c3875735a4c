use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a CORS layer restricted to the given origins.
///
/// - Methods: GET, POST, PUT, DELETE, PATCH, OPTIONS
/// - Headers: Content-Type, Accept
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer that allows any origin.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Parse a comma-separated origin list, ignoring blank entries.
pub fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {CORS_ALLOWED_ORIGIN} value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{CORS_ALLOWED_ORIGIN} cannot be empty"),
        ));
    }

    Ok(origins)
}

/// CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Unset means any origin is allowed. A set but unparsable value is an error.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    match std::env::var(CORS_ALLOWED_ORIGIN) {
        Ok(raw) => {
            let origins = parse_origins(&raw)?;
            tracing::info!("CORS configured with allowed origins: {}", raw);
            Ok(create_cors_layer(origins))
        }
        Err(_) => {
            tracing::warn!("{CORS_ALLOWED_ORIGIN} not set, allowing any origin");
            Ok(create_permissive_cors_layer())
        }
    }
}
