use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feed_orchestrator::config::Settings;
use feed_orchestrator::error::AppError;
use feed_orchestrator::lifecycle::Lifecycle;
use feed_orchestrator::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new().map_err(AppError::Config)?;
    tracing::info!("Configuration loaded");

    // Create application state
    let state = AppState::new(settings.clone());
    let lifecycle = Arc::new(Lifecycle::new(state.db.clone()));

    // Connect to PostgreSQL and bootstrap the schema; a failure here
    // aborts the process after cleanup.
    tracing::info!("Starting FeedOrchestrator application");
    if let Err(e) = lifecycle.startup().await {
        tracing::error!(error = %e, "Application startup failed");
        lifecycle.shutdown().await;
        return Err(anyhow::Error::new(e).context("application startup aborted"));
    }

    // Run server with graceful shutdown; `serve` closes the pool on
    // every exit path, including bind and serve failures.
    serve(&settings, state, &lifecycle, shutdown_signal()).await?;

    tracing::info!("Application shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
