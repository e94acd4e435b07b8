use crate::data::{CoreError, Document, TraceContext};
use crate::services::messages::{IngestionMessage, IngestionReport};
use tokio::sync::{mpsc, oneshot};

/// Client interface for the ingestion service.
/// Cloning is cheap; every clone feeds the same service loop.
#[derive(Clone)]
pub struct IngestionClient {
    ingestion_tx: mpsc::Sender<IngestionMessage>,
}

impl IngestionClient {
    pub fn new(ingestion_tx: mpsc::Sender<IngestionMessage>) -> Self {
        IngestionClient { ingestion_tx }
    }

    /// Sends a raw message to the IngestionService.
    pub async fn send(&self, message: IngestionMessage) -> Result<(), CoreError> {
        self.ingestion_tx
            .send(message)
            .await
            .map_err(|_| CoreError::Internal("Ingestion channel closed".to_string()))
    }

    /// Ingests a document and waits for the service to report back.
    pub async fn ingest(
        &self,
        document: Document,
        source_info: Option<String>,
    ) -> Result<IngestionReport, CoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(IngestionMessage::Document {
            trace_ctx: TraceContext::new_root(),
            document,
            source_info,
            reply: Some(reply_tx),
        })
        .await?;

        reply_rx
            .await
            .map_err(|_| CoreError::Internal("Ingestion reply channel closed by service".to_string()))?
    }

    /// Queues a document without waiting for the outcome. Failures are only logged by the service.
    pub async fn submit(
        &self,
        document: Document,
        source_info: Option<String>,
    ) -> Result<(), CoreError> {
        self.send(IngestionMessage::Document {
            trace_ctx: TraceContext::new_root(),
            document,
            source_info,
            reply: None,
        })
        .await
    }
}
