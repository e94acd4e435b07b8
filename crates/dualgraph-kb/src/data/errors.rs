//! Error types for the dualgraph knowledge base

use std::fmt;
use thiserror::Error;
use crate::data::TraceContext;

/// Which collaborator a store failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Document,
    Graph,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Document => write!(f, "document store"),
            StoreKind::Graph => write!(f, "graph store"),
        }
    }
}

/// Base Error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Document too deep: depth {depth} exceeds limit {limit}")]
    DocumentTooDeep {
        depth: usize,
        limit: usize,
    },

    #[error("Document too large: more than {limit} keys")]
    DocumentTooLarge {
        limit: usize,
    },

    #[error("{store} unavailable: {message}")]
    StoreUnavailable {
        store: StoreKind,
        message: String,
        trace_id: Option<String>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wraps a collaborator failure, keeping the original error as the source.
    pub fn store_unavailable<E>(
        store: StoreKind,
        message: impl Into<String>,
        trace_ctx: Option<&TraceContext>,
        source: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CoreError::StoreUnavailable {
            store,
            message: message.into(),
            trace_id: trace_ctx.map(|ctx| ctx.trace_id.to_string()),
            source: Box::new(source),
        }
    }

    /// True for failures that come from a document's shape rather than its stores.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedDocument(_)
                | CoreError::DocumentTooDeep { .. }
                | CoreError::DocumentTooLarge { .. }
        )
    }
}

/// Specific error type for the Graph Store (Gremlin interaction).
#[derive(Error, Debug)]
pub enum GraphStoreError {
    #[error("Graph database connection error: {0}")]
    ConnectionError(String),
    #[error("Graph query execution error: {0}")]
    QueryError(String),
    #[error("Data mapping error from graph result: {0}")]
    MappingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_core_error_display() {
        let error = CoreError::MalformedDocument("root is not a mapping".into());
        assert_eq!(format!("{}", error), "Malformed document: root is not a mapping");

        let error = CoreError::DocumentTooDeep { depth: 65, limit: 64 };
        assert_eq!(format!("{}", error), "Document too deep: depth 65 exceeds limit 64");
    }

    #[test]
    fn test_graph_store_error_display() {
        let error = GraphStoreError::ConnectionError("connection failed".into());
        assert_eq!(format!("{}", error), "Graph database connection error: connection failed");
    }

    #[test]
    fn test_graph_store_error_variants_are_all_raised() {
        // Every variant has a producer in the gremlin adapter or the memory store
        let errors = [
            GraphStoreError::ConnectionError("refused".into()),
            GraphStoreError::QueryError("bad traversal".into()),
            GraphStoreError::MappingError("no count".into()),
        ];
        for error in errors {
            let prefix = match error {
                GraphStoreError::ConnectionError(_) => "Graph database connection error",
                GraphStoreError::QueryError(_) => "Graph query execution error",
                GraphStoreError::MappingError(_) => "Data mapping error",
            };
            assert!(error.to_string().starts_with(prefix));
        }
    }

    #[test]
    fn test_store_unavailable_keeps_source() {
        let trace_ctx = TraceContext::new_root();

        let error = CoreError::store_unavailable(
            StoreKind::Graph,
            "Failed to submit vertex",
            Some(&trace_ctx),
            GraphStoreError::ConnectionError("refused".into()),
        );

        assert_eq!(format!("{}", error), "graph store unavailable: Failed to submit vertex");
        let source = error.source().expect("source should be kept");
        assert_eq!(source.to_string(), "Graph database connection error: refused");

        match error {
            CoreError::StoreUnavailable { store, trace_id, .. } => {
                assert_eq!(store, StoreKind::Graph);
                assert_eq!(trace_id, Some(trace_ctx.trace_id));
            },
            _ => panic!("Expected StoreUnavailable"),
        }
    }

    #[test]
    fn test_is_document_error() {
        assert!(CoreError::DocumentTooLarge { limit: 1 }.is_document_error());
        assert!(!CoreError::Internal("x".into()).is_document_error());
    }
}
