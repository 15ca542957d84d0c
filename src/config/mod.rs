mod settings;

pub use settings::{DatabaseConfig, HealthConfig, ServerConfig, Settings};
