//! Workload Console - operator console backend
//!
//! Runs next to or inside the cluster, lists workloads per namespace,
//! groups them into applications by label and scales them on request.

use anyhow::{Context, Result};
use console_lib::{ConsoleMetrics, HealthRegistry, KubeWorkloadReader, StructuredLogger};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use workload_console::{api, config::ConsoleConfig};

const CONSOLE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting workload-console");

    let config = ConsoleConfig::load()?;
    info!(listen_addr = %config.listen_addr(), instance = %config.instance, "Console configured");

    let health_registry = HealthRegistry::new();
    api::register_components(&health_registry).await;

    // In-cluster service account first, then ~/.kube/config
    let reader = KubeWorkloadReader::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let metrics = ConsoleMetrics::new();
    let logger = StructuredLogger::new(&config.instance);

    let app_state = Arc::new(api::AppState::new(
        Arc::new(reader),
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    api::check_cluster(&app_state).await;

    let mut app = api::create_router(app_state);
    if config.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;

    health_registry.set_ready(true).await;
    logger.log_startup(CONSOLE_VERSION, &config.listen_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
