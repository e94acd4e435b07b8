//! Adapters for external graph services

pub mod gremlin_http;

// Re-export adapters for easier import
pub use gremlin_http::{GremlinHttpConfig, HttpGremlinStore};
