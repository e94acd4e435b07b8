//! Dualgraph knowledge base
//!
//! Projects nested documents into concept vertices and containment edges and
//! ingests them into an account reachable through both a document API and a
//! Gremlin API.

// Core modules
pub mod data;
pub mod traits;
pub mod projection;
pub mod services;
pub mod storage;
pub mod config;

// Implementation adapters (optional, can be provided externally)
#[cfg(feature = "adapters")]
pub mod adapters;

// Testing utilities
pub mod test_utils;

use std::sync::Arc;

// Re-export key types for convenient usage
pub use data::errors::{CoreError, GraphStoreError, StoreKind};
pub use data::identifiers::VertexId;
pub use data::types::{Edge, GraphStatement, Vertex};
pub use data::document::Document;
pub use data::trace_context::TraceContext;
pub use projection::{GraphProjector, GremlinScript, Projection, ProjectionLimits};
pub use config::{AppConfig, ConfigMismatch};

// Re-export core traits
pub use traits::{DocumentStorage, GraphStore};

// Re-export core services
pub use services::{
    IngestionClient, IngestionMessage, IngestionReport, IngestionService, Ingestor,
};

pub use storage::{InMemoryDocumentStore, InMemoryGraphStore};

#[cfg(feature = "adapters")]
pub use adapters::{GremlinHttpConfig, HttpGremlinStore};

/// Initialize tracing. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed (tests, host applications)
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Creates the graph store named by the configuration: the HTTP Gremlin
/// adapter when an endpoint is configured, otherwise an in-memory graph.
pub fn create_graph_store(config: &AppConfig) -> Result<Arc<dyn GraphStore>, CoreError> {
    match config.gremlin_endpoint.as_deref() {
        #[cfg(feature = "adapters")]
        Some(endpoint) => {
            tracing::info!(endpoint, username = %config.gremlin_username(), "Using HTTP Gremlin store");
            let store = HttpGremlinStore::with_url_and_timeout(endpoint, config.gremlin_timeout_secs)
                .map_err(|e| CoreError::ConfigurationError(e.to_string()))?;
            Ok(Arc::new(store))
        },
        #[cfg(not(feature = "adapters"))]
        Some(endpoint) => Err(CoreError::ConfigurationError(format!(
            "GREMLIN_ENDPOINT {} requires the 'adapters' feature",
            endpoint
        ))),
        None => {
            tracing::info!("Using in-memory graph store");
            Ok(Arc::new(InMemoryGraphStore::new()))
        },
    }
}
