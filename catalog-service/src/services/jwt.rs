use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use service_core::error::AppError;
use thiserror::Error;

use crate::config::JwtConfig;

/// Decoded payload of a verified bearer token. No particular claim is
/// required; a successful decode is what authorizes the caller.
pub type Claims = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Header absent, not a `Bearer` credential, or empty.
    #[error("Missing or malformed Authorization header")]
    Unauthorized,

    /// Credential present but rejected. The reason is never reported.
    #[error("Invalid token")]
    InvalidToken,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => AppError::Unauthorized(anyhow::anyhow!(err)),
            AuthError::InvalidToken => AppError::InvalidToken,
        }
    }
}

/// Validates admin bearer credentials.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 JWT signing and verification with the shared admin secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let secret = config.secret.expose_secret();
        if secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // `exp`/`nbf` are checked when present but not demanded.
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;
        validation.validate_aud = false;

        tracing::info!("JWT service initialized with HS256 shared secret");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign `claims` with the shared secret.
    pub fn issue(&self, claims: &Claims) -> Result<String, anyhow::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
    }
}

impl TokenVerifier for JwtService {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                AuthError::InvalidToken
            })
    }
}
