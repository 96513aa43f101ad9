//! Diabetes Screening Service - Main Entry Point
//!
//! Loads the model bundle once at startup, then serves the screening
//! form and prediction endpoint.

use anyhow::Result;
use diabetes_screener::{
    config::AppConfig,
    metrics::{MetricsReporter, ScreenerMetrics},
    models::{ModelLoader, VoteEnsemble},
    server::{self, ServerState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("diabetes_screener=info".parse()?),
        )
        .init();

    info!("Starting Diabetes Screening Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        bundle = %config.models.bundle_path,
        policy = ?config.models.vote_policy,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics = Arc::new(ScreenerMetrics::new());

    // Load the model bundle; a missing or unreadable bundle is fatal
    // and the process never starts serving.
    let loader = ModelLoader::new();
    let models = loader.load(&config.models.bundle_path)?;

    let ensemble = Arc::new(VoteEnsemble::new(models, config.models.vote_policy.clone()));
    info!(
        count = ensemble.model_count(),
        names = ?ensemble.model_names(),
        "Ensemble initialized"
    );

    // Start metrics reporter (logs a summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    let state = ServerState { ensemble, metrics };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(addr = %addr, "Listening");

    warp::serve(server::routes(state)).run(addr).await;

    Ok(())
}
