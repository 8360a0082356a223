use secrecy::Secret;
use service_core::config::{self as core_config, get_env, Environment};
use service_core::error::AppError;
use std::path::PathBuf;

pub const DEFAULT_POINTER_KEY: &str = "catalog.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    /// OTLP collector; trace export is disabled when unset.
    pub otlp_endpoint: Option<String>,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret for admin bearer tokens.
    pub secret: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the catalog asset and its pointer record.
    pub root: PathBuf,
    /// Well-known key of the pointer record inside `root`.
    pub pointer_key: String,
    pub max_upload_bytes: usize,
}

impl CatalogConfig {
    /// Loads configuration once at startup. The result is never mutated.
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let environment = Environment::current()?;
        let is_prod = environment.is_prod();

        let max_upload_bytes = get_env(
            "CATALOG_MAX_UPLOAD_BYTES",
            Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
            is_prod,
        )?
        .parse()
        .map_err(|e: std::num::ParseIntError| {
            AppError::ConfigError(anyhow::anyhow!("CATALOG_MAX_UPLOAD_BYTES: {}", e))
        })?;

        let secret = get_env("JWT_SECRET", None, is_prod)?;
        if secret.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        Ok(CatalogConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("catalog-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: std::env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.is_empty()),
            jwt: JwtConfig {
                secret: Secret::new(secret),
            },
            storage: StorageConfig {
                root: PathBuf::from(get_env("CATALOG_STORAGE_ROOT", Some("storage"), is_prod)?),
                pointer_key: get_env("CATALOG_POINTER_KEY", Some(DEFAULT_POINTER_KEY), is_prod)?,
                max_upload_bytes,
            },
        })
    }
}
