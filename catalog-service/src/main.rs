use catalog_service::config::CatalogConfig;
use catalog_service::services::metrics::init_metrics;
use catalog_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        environment = ?config.environment,
        storage_root = %config.storage.root.display(),
        pointer_key = %config.storage.pointer_key,
        max_upload_bytes = config.storage.max_upload_bytes,
        otlp = config.otlp_endpoint.is_some(),
        "Starting catalog service"
    );

    let application = Application::build(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;
    application.run_until_stopped().await?;

    tracing::info!("Catalog service stopped");
    Ok(())
}
