//! Optimizer Server - Cloud cost recommendation API
//!
//! Serves idle, rightsizing and savings recommendations computed from a
//! recorded inventory snapshot, evaluates the monthly budget and persists
//! reports on request.

use anyhow::{Context, Result};
use optimizer_lib::{
    alerts::BudgetMonitor,
    engine::{EngineConfig, OptimizationEngine},
    observability::{OptimizerMetrics, StructuredLogger},
    processing::{DatasetBuilder, InventoryNormalizer},
    report::FileReportStore,
    source::SnapshotSource,
};
use optimizer_server::{api, config::ServerConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting optimizer-server");

    let config = ServerConfig::load()?;
    let regions = config.regions()?;
    info!(regions = ?regions, port = config.api_port, "Server configured");

    // Register metrics before the first scrape
    let _metrics = OptimizerMetrics::new();

    let logger = StructuredLogger::new("optimizer-server");
    logger.log_startup(SERVER_VERSION, &regions);

    let source = Arc::new(
        SnapshotSource::load(Path::new(&config.snapshot_path))
            .await
            .context("failed to load inventory snapshot")?,
    );

    let inventory =
        InventoryNormalizer::new(source.clone(), source.clone(), config.inventory_config()?);
    let engine = Arc::new(OptimizationEngine::new(
        DatasetBuilder::new(inventory, source),
        EngineConfig::default(),
    ));

    let budget = Arc::new(BudgetMonitor::new(
        config.budget_config(),
        config.build_notifier()?,
    ));
    let reports = Arc::new(FileReportStore::new(&config.report_dir));

    let app_state = Arc::new(api::AppState::new(
        engine,
        budget,
        reports,
        config.primary_region()?,
    ));

    tokio::select! {
        result = api::serve(config.api_port, app_state) => {
            result.context("API server failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
