//! HTTP surface integration tests.
//!
//! These exercise the router end to end through `tower::ServiceExt`
//! without requiring a running PostgreSQL server: an unconnected
//! manager is enough to drive both health outcomes that matter here.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use feed_orchestrator::config::{DatabaseConfig, HealthConfig, ServerConfig, Settings};
use feed_orchestrator::lifecycle::{Lifecycle, LifecyclePhase};
use feed_orchestrator::server::{create_app, serve, AppState};

fn test_settings(strict_status: bool) -> Settings {
    Settings {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            db: "database".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            connect_timeout_seconds: 1,
            pool_size: 1,
        },
        health: HealthConfig { strict_status },
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_root_reports_running_regardless_of_database() {
    let app = create_app(AppState::new(test_settings(false)));

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "FeedOrchestrator");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_health_unreachable_database_still_responds_200() {
    // Manager never connected: the handler must catch the failure and
    // report it in the body, not as a transport error.
    let app = create_app(AppState::new(test_settings(false)));

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "unreachable");
}

#[tokio::test]
async fn test_health_strict_mode_returns_503_on_failure() {
    let app = create_app(AppState::new(test_settings(true)));

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "unreachable");
}

#[tokio::test]
async fn test_health_is_idempotent_under_repeated_calls() {
    let state = AppState::new(test_settings(false));

    for _ in 0..3 {
        let (status, body) = get(create_app(state.clone()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
    }
}

#[tokio::test]
async fn test_bind_failure_still_runs_cleanup() {
    // Occupy a port so the serve path fails before accepting requests.
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let mut settings = test_settings(false);
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = port;

    let state = AppState::new(settings.clone());
    let lifecycle = Lifecycle::new(state.db.clone());

    let result = serve(&settings, state, &lifecycle, std::future::pending::<()>()).await;

    assert!(result.is_err());
    // Cleanup must run even though serving never started.
    assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
}

#[tokio::test]
async fn test_graceful_shutdown_runs_cleanup() {
    let mut settings = test_settings(false);
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = 0;

    let state = AppState::new(settings.clone());
    let lifecycle = Lifecycle::new(state.db.clone());

    // Shutdown future resolves immediately; serve binds, drains, returns.
    let result = serve(&settings, state, &lifecycle, async {}).await;

    assert!(result.is_ok());
    assert_eq!(lifecycle.phase(), LifecyclePhase::Stopped);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_app(AppState::new(test_settings(false)));

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
