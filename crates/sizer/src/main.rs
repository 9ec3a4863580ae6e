//! Workload sizer - HTTP service for hardware sizing estimates

use anyhow::{Context, Result};
use sizer_lib::{
    health::{components, HealthRegistry},
    MetricsObserver, SizerMetrics, SizingEngine, TracingObserver,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use workload_sizer::{api, config::ServerConfig};

const SIZER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load()?;
    let engine_config = config.engine_config()?;

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::CATALOG).await;

    let metrics = SizerMetrics::new();
    metrics.set_model_version(
        engine_config.model_version.as_str(),
        &engine_config.constants.revision,
    );

    let observer = MetricsObserver::new(metrics, Arc::new(TracingObserver::new("api")));
    let engine = SizingEngine::builder()
        .config(engine_config)
        .observer(Arc::new(observer))
        .build()
        .context("Failed to build sizing engine")?;

    info!(
        event = "sizer_started",
        version = SIZER_VERSION,
        model_version = %engine.model_version(),
        instances = engine.catalog().instances().len(),
        "Workload sizer started"
    );

    let cors = api::cors_layer(&config.allowed_origin)?;
    let state = Arc::new(api::AppState::new(engine, health_registry.clone()));
    health_registry.set_ready(true).await;

    api::serve(config.api_port, api::create_router(state, cors)).await?;

    info!(event = "sizer_shutdown", "Workload sizer stopped");
    Ok(())
}
