//! API layer - HTTP endpoint handlers.

mod health;
mod routes;

pub use health::{health, root, HealthResponse, ServiceInfo, SERVICE_NAME};
pub use routes::api_routes;
