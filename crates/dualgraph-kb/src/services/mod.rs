//! Services that move documents into the dual-API account

pub mod ingestion;
pub mod messages;
pub mod client;

// Re-exports
pub use ingestion::{IngestionService, Ingestor};
pub use messages::{IngestionMessage, IngestionReplySender, IngestionReport};
pub use client::IngestionClient;
