use std::sync::Arc;

use chrono::Utc;
use dualgraph_document_store::DocumentStorage;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, instrument, warn};

use crate::{
    data::{CoreError, Document, GraphStatement, StoreKind, TraceContext},
    projection::GraphProjector,
    services::messages::{IngestionMessage, IngestionReport},
    traits::GraphStore,
};

/// Projects documents and writes them to both sides of the account.
///
/// Store handles are injected once at construction; the projector itself
/// stays free of any handle.
#[derive(Clone)]
pub struct Ingestor {
    projector: GraphProjector,
    document_store: Arc<dyn DocumentStorage>,
    graph_store: Arc<dyn GraphStore>,
}

impl Ingestor {
    pub fn new(
        projector: GraphProjector,
        document_store: Arc<dyn DocumentStorage>,
        graph_store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            projector,
            document_store,
            graph_store,
        }
    }

    pub fn projector(&self) -> &GraphProjector {
        &self.projector
    }

    /// Ingests one document: upserts the flat record, then submits every graph
    /// statement in projection order.
    ///
    /// Store failures abort the document and surface as `StoreUnavailable`
    /// with the store's own error as the source. Nothing is rolled back; a
    /// retry of the whole document is safe because every statement is an
    /// upsert keyed by a deterministic id.
    #[instrument(skip(self, document), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn ingest(
        &self,
        document: &Document,
        trace_ctx: &TraceContext,
    ) -> Result<IngestionReport, CoreError> {
        let projection = self.projector.project(document)?;
        let document_id = projection.record.id.clone();

        info!(
            document_id = %document_id,
            vertices = projection.vertex_count(),
            edges = projection.edge_count(),
            "Projected document"
        );

        self.document_store
            .upsert(&projection.record)
            .await
            .map_err(|e| CoreError::store_unavailable(
                StoreKind::Document,
                format!("Failed to upsert document record {}", document_id),
                Some(trace_ctx),
                e,
            ))?;

        let mut vertices_submitted = 0;
        let mut edges_submitted = 0;
        for (position, statement) in projection.statements.iter().enumerate() {
            let statement_ctx = trace_ctx.new_child();
            let rows = self.graph_store
                .submit(&statement_ctx, statement)
                .await
                .map_err(|e| {
                    warn!(
                        document_id = %document_id,
                        span = %statement_ctx,
                        position,
                        total = projection.statements.len(),
                        "Graph submission failed, document partially projected"
                    );
                    CoreError::store_unavailable(
                        StoreKind::Graph,
                        format!("Failed to submit statement {} of document {}", position, document_id),
                        Some(&statement_ctx),
                        e,
                    )
                })?;

            match statement {
                GraphStatement::UpsertVertex(_) => vertices_submitted += 1,
                GraphStatement::UpsertEdge(edge) => {
                    if rows.is_empty() {
                        warn!(from = %edge.from_id, to = %edge.to_id, "Edge matched no vertices");
                    }
                    edges_submitted += 1;
                },
            }
        }

        info!(
            document_id = %document_id,
            vertices_submitted,
            edges_submitted,
            "Successfully ingested document"
        );

        Ok(IngestionReport {
            document_id,
            trace_id: trace_ctx.trace_id.clone(),
            vertices_submitted,
            edges_submitted,
            completed_at: Utc::now(),
        })
    }
}

/// Service responsible for ingesting documents received via channel.
/// Each message is processed in a separate task; statements of one document
/// are still submitted sequentially inside that task.
pub struct IngestionService {
    ingestor: Ingestor,
    ingestion_rx: mpsc::Receiver<IngestionMessage>,
    in_flight: JoinSet<()>,
}

impl IngestionService {
    pub fn new(ingestor: Ingestor, ingestion_rx: mpsc::Receiver<IngestionMessage>) -> Self {
        Self {
            ingestor,
            ingestion_rx,
            in_flight: JoinSet::new(),
        }
    }

    /// Number of documents spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Runs the service until every sender is dropped, then waits for
    /// in-flight documents to finish.
    pub async fn run(&mut self) -> Result<(), CoreError> {
        info!("IngestionService started");

        while self.process_next().await {}

        while let Some(joined) = self.in_flight.join_next().await {
            log_join_result(joined);
        }

        info!("IngestionService channel closed, shutting down");
        Ok(())
    }

    /// Handles whichever comes first: a finished task to reap or a new
    /// message to spawn. Returns false once the channel is closed.
    pub async fn process_next(&mut self) -> bool {
        tokio::select! {
            Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                log_join_result(joined);
                true
            },
            msg = self.ingestion_rx.recv() => match msg {
                Some(msg) => {
                    self.spawn(msg);
                    true
                },
                None => false,
            },
        }
    }

    fn spawn(&mut self, msg: IngestionMessage) {
        let ingestor = self.ingestor.clone();

        self.in_flight.spawn(async move {
            match msg {
                IngestionMessage::Document { trace_ctx, document, source_info, reply } => {
                    info!(
                        trace_id = %trace_ctx.trace_id,
                        source = source_info.as_deref().unwrap_or("unknown"),
                        "Processing document"
                    );

                    let result = ingestor.ingest(&document, &trace_ctx).await;
                    if let Err(e) = &result {
                        error!(
                            trace_id = %trace_ctx.trace_id,
                            error = %e,
                            "Failed to ingest document"
                        );
                    }

                    if let Some(reply) = reply {
                        // The caller may have stopped waiting
                        let _ = reply.send(result);
                    }
                },
            }
        });
    }
}

fn log_join_result(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Ingestion task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{errors::GraphStoreError, VertexId},
        storage::{InMemoryDocumentStore, InMemoryGraphStore},
        test_utils::{MockDocumentStore, MockGraphStore},
    };
    use serde_json::json;
    use std::error::Error as _;
    use tokio::sync::oneshot;

    fn sample_document() -> Document {
        Document::new(json!({
            "Advanced Decision Engine": {
                "Price Discovery": {
                    "Multi-Venue": {
                        "Aggregation": ["Best bid/offer", "VWAP"]
                    }
                }
            }
        }))
    }

    fn in_memory_ingestor() -> (Ingestor, InMemoryDocumentStore, InMemoryGraphStore) {
        let documents = InMemoryDocumentStore::new();
        let graph = InMemoryGraphStore::new();
        let ingestor = Ingestor::new(
            GraphProjector::default(),
            Arc::new(documents.clone()),
            Arc::new(graph.clone()),
        );
        (ingestor, documents, graph)
    }

    #[tokio::test]
    async fn test_ingest_writes_both_stores() {
        let (ingestor, documents, graph) = in_memory_ingestor();
        let ctx = TraceContext::new_root();

        let report = ingestor.ingest(&sample_document(), &ctx).await.unwrap();

        assert_eq!(report.vertices_submitted, 4);
        assert_eq!(report.edges_submitted, 3);
        assert_eq!(report.trace_id, ctx.trace_id);
        assert!(documents.exists(&report.document_id).await.unwrap());
        assert_eq!(graph.vertex_count(&ctx).await.unwrap(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[tokio::test]
    async fn test_reingesting_creates_no_duplicates() {
        let (ingestor, documents, graph) = in_memory_ingestor();
        let ctx = TraceContext::new_root();

        let first = ingestor.ingest(&sample_document(), &ctx).await.unwrap();
        let second = ingestor.ingest(&sample_document(), &ctx).await.unwrap();

        assert_eq!(first.document_id, second.document_id);
        assert_eq!(documents.len().await, 1);
        assert_eq!(graph.vertex_count(&ctx).await.unwrap(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_document_touches_no_store() {
        let documents = MockDocumentStore::new();
        let graph = MockGraphStore::new();
        let ingestor = Ingestor::new(
            GraphProjector::default(),
            Arc::new(documents.clone()),
            Arc::new(graph.clone()),
        );

        let err = ingestor
            .ingest(&Document::new(json!(["not", "a", "mapping"])), &TraceContext::new_root())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::MalformedDocument(_)));
        assert!(documents.upserted().is_empty());
        assert!(graph.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_document_store_failure_stops_before_graph() {
        let documents = MockDocumentStore::new();
        documents.failing_upserts("request timed out");
        let graph = MockGraphStore::new();
        let ingestor = Ingestor::new(
            GraphProjector::default(),
            Arc::new(documents),
            Arc::new(graph.clone()),
        );

        let err = ingestor
            .ingest(&sample_document(), &TraceContext::new_root())
            .await
            .unwrap_err();

        match &err {
            CoreError::StoreUnavailable { store, .. } => assert_eq!(*store, StoreKind::Document),
            other => panic!("Expected StoreUnavailable, got {:?}", other),
        }
        assert_eq!(err.source().unwrap().to_string(), "Operation timed out: request timed out");
        assert!(graph.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_graph_failure_propagates_unmodified() {
        let graph = MockGraphStore::new();
        graph.failing_after(2, GraphStoreError::ConnectionError("socket closed".to_string()));
        let ingestor = Ingestor::new(
            GraphProjector::default(),
            Arc::new(MockDocumentStore::new()),
            Arc::new(graph.clone()),
        );
        let ctx = TraceContext::new_root();

        let err = ingestor.ingest(&sample_document(), &ctx).await.unwrap_err();

        match &err {
            CoreError::StoreUnavailable { store, trace_id, .. } => {
                assert_eq!(*store, StoreKind::Graph);
                assert_eq!(trace_id.as_deref(), Some(ctx.trace_id.as_str()));
            },
            other => panic!("Expected StoreUnavailable, got {:?}", other),
        }
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<GraphStoreError>().is_some());
        // Two successes plus the failing statement, nothing after it
        assert_eq!(graph.submitted().len(), 3);
    }

    #[tokio::test]
    async fn test_service_replies_through_channel() {
        let (ingestor, _documents, graph) = in_memory_ingestor();
        let (tx, rx) = mpsc::channel(10);
        let mut service = IngestionService::new(ingestor, rx);

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(IngestionMessage::Document {
            trace_ctx: TraceContext::new_root(),
            document: sample_document(),
            source_info: Some("unit-test".to_string()),
            reply: Some(reply_tx),
        })
        .await
        .expect("Failed to send test message");
        tx.send(IngestionMessage::Document {
            trace_ctx: TraceContext::new_root(),
            document: Document::new(json!({"other": {"Price Discovery": 1}})),
            source_info: None,
            reply: None,
        })
        .await
        .expect("Failed to send test message");

        // Drop tx to signal that no more messages will be sent
        drop(tx);
        service.run().await.unwrap();

        let report = reply_rx.await.unwrap().unwrap();
        assert_eq!(report.vertices_submitted, 4);
        // "Price Discovery" is shared between both documents
        assert_eq!(graph.vertex_count(&TraceContext::new_root()).await.unwrap(), 5);
        assert!(graph.vertex(&VertexId::for_key("other")).is_some());
    }

    #[tokio::test]
    async fn test_finished_tasks_are_reaped_while_running() {
        let (ingestor, _documents, _graph) = in_memory_ingestor();
        let (tx, rx) = mpsc::channel(10);
        let mut service = IngestionService::new(ingestor, rx);

        for round in 0..3 {
            let (reply_tx, reply_rx) = oneshot::channel();
            tx.send(IngestionMessage::Document {
                trace_ctx: TraceContext::new_root(),
                document: Document::new(json!({ "round": round })),
                source_info: None,
                reply: Some(reply_tx),
            })
            .await
            .expect("Failed to send test message");

            assert!(service.process_next().await);
            assert_eq!(service.in_flight(), 1);

            reply_rx.await.unwrap().unwrap();
            // Channel is empty and still open, so the only event is the finished task
            assert!(service.process_next().await);
            assert_eq!(service.in_flight(), 0);
        }

        drop(tx);
        assert!(!service.process_next().await);
    }
}
