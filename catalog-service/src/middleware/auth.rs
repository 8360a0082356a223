use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::services::{AuthError, Claims};
use crate::AppState;

/// Token from an `Authorization: Bearer <token>` header, if well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware to require a valid admin bearer token.
///
/// Requests without a well-formed header are refused before the verifier
/// runs. Verified claims are stored in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "Missing or malformed Authorization header");
        return Err(AuthError::Unauthorized.into());
    };

    let claims = state.verifier.verify(token).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), "Bearer token rejected");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(AuthUser(claims));

    Ok(next.run(req).await)
}

/// Claims of the authenticated caller, placed by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth claims missing from request extensions"
            ))
        })
    }
}
