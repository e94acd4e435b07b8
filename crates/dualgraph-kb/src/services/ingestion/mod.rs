//! Document ingestion: projection followed by writes to both stores

pub mod service;

pub use service::{IngestionService, Ingestor};
