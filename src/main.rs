// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::{load_app_config, load_presets};
use crate::infrastructure::mock_repository::MockImbalanceRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let presets = load_presets()?;
    presets
        .get(&app_config.dashboard.default_preset)
        .context("Default preset is not configured")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(MockImbalanceRepository::new(presets, app_config.dashboard.seed));

    // Create services and application state
    let state = Arc::new(AppState::new(repository, app_config.dashboard));

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind))?;
    tracing::info!("Starting flexbalance-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
