use axum::Json;

use crate::dtos::VerifyResponse;
use crate::middleware::AuthUser;

/// Echoes the claims of an already verified token.
pub async fn verify_token(AuthUser(claims): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        message: "Token is valid".to_string(),
        user: claims,
    })
}
