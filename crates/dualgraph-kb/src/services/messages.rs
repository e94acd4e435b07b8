//! Message types for service communication

use chrono::{DateTime, Utc};
use dualgraph_document_store::DocumentId;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::data::{CoreError, Document, TraceContext};

/// Channel used to hand an ingestion outcome back to the caller
pub type IngestionReplySender = oneshot::Sender<Result<IngestionReport, CoreError>>;

/// Message type for ingestion operations
#[derive(Debug)]
pub enum IngestionMessage {
    Document {
        trace_ctx: TraceContext,
        document: Document,
        source_info: Option<String>,
        /// Absent for fire-and-forget submissions
        reply: Option<IngestionReplySender>,
    },
}

/// Outcome of ingesting one document into both stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub document_id: DocumentId,
    pub trace_id: String,
    pub vertices_submitted: usize,
    pub edges_submitted: usize,
    pub completed_at: DateTime<Utc>,
}
