use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{http_trace_layer, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::CatalogConfig;
use crate::handlers;
use crate::middleware::{auth_middleware, cors_layer};
use crate::services::{CatalogService, JwtService, LocalStorage, Storage};
use crate::AppState;

/// Slack on top of the file limit for multipart boundaries and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the admin API. Authentication wraps only the routed methods of
/// `/verify` and `/catalog`, so method fallbacks answer without a token.
pub fn build_router(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), auth_middleware);
    let body_limit = state
        .config
        .storage
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/verify",
            post(handlers::verify_token)
                .route_layer(auth.clone())
                .fallback(handlers::method_fallback),
        )
        .route(
            "/catalog",
            post(handlers::publish_catalog)
                .delete(handlers::delete_catalog)
                .route_layer(auth)
                .fallback(handlers::method_fallback),
        )
        .route(
            "/catalog/current",
            get(handlers::current_catalog).fallback(handlers::method_fallback),
        )
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::method_fallback),
        )
        .route(
            "/metrics",
            get(handlers::metrics_endpoint).fallback(handlers::method_fallback),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: CatalogConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.root).await.map_err(|e| {
                tracing::error!(
                    "Failed to initialize local storage at {}: {}",
                    config.storage.root.display(),
                    e
                );
                AppError::StorageError(anyhow::Error::new(e))
            })?,
        );

        let catalog = Arc::new(CatalogService::new(
            storage,
            config.storage.pointer_key.clone(),
        ));
        let verifier = Arc::new(JwtService::new(&config.jwt).map_err(AppError::ConfigError)?);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = AppState::new(config, verifier, catalog);
        let router = build_router(state);

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
