//! Store implementations that live in-process

pub mod memory;

pub use memory::InMemoryGraphStore;
pub use dualgraph_document_store::InMemoryDocumentStore;
