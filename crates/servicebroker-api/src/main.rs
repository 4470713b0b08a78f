//! Service Broker API Server Binary
//!
//! Serves the broker protocol in front of the in-memory reference broker.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use servicebroker_api::{create_router, AppState, ServerConfig, TracingSink};
use servicebroker_core::MemoryBroker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Initialize the broker
    let catalog = config.load_catalog()?;
    let mut builder = MemoryBroker::builder(catalog).mode(config.provisioning_mode);
    if let Some(limit) = config.instance_limit {
        builder = builder.instance_limit(limit);
    }
    let broker = Arc::new(builder.build());

    info!(
        port = config.port,
        provisioning_mode = ?config.provisioning_mode,
        instance_limit = ?config.instance_limit,
        "Starting service broker API"
    );

    let state = Arc::new(AppState::new(
        broker,
        config.credentials.clone(),
        Arc::new(TracingSink),
    ));

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "Service broker API listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
