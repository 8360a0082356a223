pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::services::{CatalogService, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CatalogConfig>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(
        config: CatalogConfig,
        verifier: Arc<dyn TokenVerifier>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            catalog,
        }
    }
}
