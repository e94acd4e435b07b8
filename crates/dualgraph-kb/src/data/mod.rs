//! Core data structures for the dualgraph knowledge base

pub mod types;
pub mod identifiers;
pub mod trace_context;
pub mod document;
pub mod errors;

// Re-export all common types
pub use types::{Vertex, Edge, GraphStatement};
pub use identifiers::VertexId;
pub use trace_context::TraceContext;
pub use document::Document;
pub use errors::{CoreError, GraphStoreError, StoreKind};
