//! Core traits (interfaces) for the dualgraph knowledge base

pub mod graph_store;

pub use graph_store::GraphStore;
pub use dualgraph_document_store::DocumentStorage;
