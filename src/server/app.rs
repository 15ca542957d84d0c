use std::future::Future;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::api_routes;
use crate::config::Settings;
use crate::lifecycle::Lifecycle;

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api_routes()
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}

/// Bind the listener and serve until `shutdown` resolves.
///
/// Lifecycle cleanup runs on every exit path: bind failure, serve error,
/// and normal termination all close the pool before any error propagates
/// to the caller.
pub async fn serve<F>(
    settings: &Settings,
    state: AppState,
    lifecycle: &Lifecycle,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = bind_and_serve(settings, state, lifecycle, shutdown).await;
    lifecycle.shutdown().await;
    result
}

async fn bind_and_serve<F>(
    settings: &Settings,
    state: AppState,
    lifecycle: &Lifecycle,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    lifecycle.mark_serving();
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
