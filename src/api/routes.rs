use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::{health, root};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
