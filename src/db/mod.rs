//! Database layer: connection lifecycle and schema bootstrap.

pub mod manager;
pub mod schema;

pub use manager::{ConnectionManager, DbError};
pub use schema::{schema, SchemaDefinition, TableSpec};
