// Infrastructure layer (shared components)
pub mod config;
pub mod db;
pub mod error;

// Persisted entities
pub mod models;

// Application layer
pub mod api;
pub mod lifecycle;
pub mod server;
