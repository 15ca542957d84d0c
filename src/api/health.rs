//! Health check endpoints.
//!
//! Intended for load balancers, container orchestrators, and monitoring
//! systems. Read-only; safe to call concurrently and repeatedly.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::server::AppState;

pub const SERVICE_NAME: &str = "FeedOrchestrator";

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// `GET /` — liveness only; never touches the database.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        status: "running",
    })
}

/// `GET /health` — verifies the database with a trivial round-trip query.
///
/// Never returns an error to the transport layer: any failure (pool not
/// initialized, connection lost, query error) is logged and reported in
/// the body. The failure status code is 200 unless `health.strict_status`
/// is set, in which case it is 503.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.db.ping().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy",
            database: "reachable",
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            let body = Json(HealthResponse {
                status: "unhealthy",
                database: "unreachable",
            });
            if state.settings.health.strict_status {
                (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
            } else {
                body.into_response()
            }
        }
    }
}
