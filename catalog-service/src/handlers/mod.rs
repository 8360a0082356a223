pub mod catalog;
pub mod health;
pub mod verify;

pub use catalog::{current_catalog, delete_catalog, publish_catalog};
pub use health::{health_check, metrics_endpoint};
pub use verify::verify_token;

use axum::http::{Method, StatusCode};
use service_core::error::AppError;

/// Fallback for known paths hit with an unrouted method. `OPTIONS` gets an
/// empty 200; everything else is a 405 with no further processing.
pub async fn method_fallback(method: Method) -> Result<StatusCode, AppError> {
    if method == Method::OPTIONS {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::MethodNotAllowed)
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not found"))
}
