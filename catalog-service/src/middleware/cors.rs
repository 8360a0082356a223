use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

const ALLOWED_HEADERS: [&str; 10] = [
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
    "authorization",
];

/// Open CORS policy for the admin API: any origin, a fixed method and
/// header list. Preflight requests are answered by the layer itself.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::DELETE,
            Method::PATCH,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
}
