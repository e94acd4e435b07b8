//! Mock implementations of the store interfaces for unit testing
//!
//! Each mock replays scripted results in order and records what it was asked
//! to do, so tests can assert on both outcomes and call sequences.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use async_trait::async_trait;
use dualgraph_document_store::{
    DocumentId, DocumentRecord, DocumentStorage, DocumentStoreError, DocumentStoreResult,
};

use crate::data::{
    errors::GraphStoreError,
    trace_context::TraceContext,
    types::GraphStatement,
};
use crate::traits::GraphStore;

/// Mock for GraphStore
#[derive(Debug, Clone, Default)]
pub struct MockGraphStore {
    submit_results: Arc<Mutex<VecDeque<Result<Vec<serde_json::Value>, GraphStoreError>>>>,
    submitted: Arc<Mutex<Vec<GraphStatement>>>,
    vertex_count: Arc<Mutex<Option<u64>>>,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next `submit` call. Unscripted calls succeed with no rows.
    pub fn returning(&self, result: Result<Vec<serde_json::Value>, GraphStoreError>) -> &Self {
        self.submit_results.lock().push_back(result);
        self
    }

    /// Queues `ok_count` successes followed by one failure.
    pub fn failing_after(&self, ok_count: usize, error: GraphStoreError) -> &Self {
        for _ in 0..ok_count {
            self.returning(Ok(Vec::new()));
        }
        self.returning(Err(error))
    }

    pub fn with_vertex_count(&self, count: u64) -> &Self {
        *self.vertex_count.lock() = Some(count);
        self
    }

    /// Statements passed to `submit`, including the one that failed
    pub fn submitted(&self) -> Vec<GraphStatement> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn submit(
        &self,
        _trace_ctx: &TraceContext,
        statement: &GraphStatement,
    ) -> Result<Vec<serde_json::Value>, GraphStoreError> {
        self.submitted.lock().push(statement.clone());
        self.submit_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn vertex_count(&self, _trace_ctx: &TraceContext) -> Result<u64, GraphStoreError> {
        match *self.vertex_count.lock() {
            Some(count) => Ok(count),
            None => Err(GraphStoreError::ConnectionError("vertex count not scripted".to_string())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mock for DocumentStorage that records upserts and can be told to fail them.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentStore {
    upsert_failure: Arc<Mutex<Option<String>>>,
    upserted: Arc<Mutex<Vec<DocumentRecord>>>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent upsert fails with a timeout carrying `message`.
    pub fn failing_upserts(&self, message: impl Into<String>) -> &Self {
        *self.upsert_failure.lock() = Some(message.into());
        self
    }

    pub fn upserted(&self) -> Vec<DocumentRecord> {
        self.upserted.lock().clone()
    }
}

#[async_trait]
impl DocumentStorage for MockDocumentStore {
    async fn upsert(&self, record: &DocumentRecord) -> DocumentStoreResult<()> {
        if let Some(message) = self.upsert_failure.lock().clone() {
            return Err(DocumentStoreError::Timeout(message));
        }
        self.upserted.lock().push(record.clone());
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> DocumentStoreResult<DocumentRecord> {
        self.upserted
            .lock()
            .iter()
            .rev()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| DocumentStoreError::NotFound(id.clone()))
    }

    async fn exists(&self, id: &DocumentId) -> DocumentStoreResult<bool> {
        Ok(self.upserted.lock().iter().any(|r| &r.id == id))
    }

    async fn delete(&self, id: &DocumentId) -> DocumentStoreResult<()> {
        self.upserted.lock().retain(|r| &r.id != id);
        Ok(())
    }

    async fn count_by_type(&self, record_type: &str) -> DocumentStoreResult<usize> {
        Ok(self
            .upserted
            .lock()
            .iter()
            .filter(|r| r.record_type == record_type)
            .count())
    }

    fn as_any(&self) -> &dyn Any where Self: 'static {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Vertex;

    #[tokio::test]
    async fn test_mock_graph_store_replays_script() {
        let store = MockGraphStore::new();
        store
            .returning(Ok(vec![serde_json::json!({"id": "v1"})]))
            .with_vertex_count(7);

        let ctx = TraceContext::new_root();
        let statement = GraphStatement::UpsertVertex(Vertex::concept("a"));

        assert_eq!(store.submit(&ctx, &statement).await.unwrap().len(), 1);
        // Script exhausted, unscripted calls succeed empty
        assert!(store.submit(&ctx, &statement).await.unwrap().is_empty());
        assert_eq!(store.submitted().len(), 2);
        assert_eq!(store.vertex_count(&ctx).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unscripted_vertex_count_fails() {
        let store = MockGraphStore::new();
        let result = store.vertex_count(&TraceContext::new_root()).await;
        assert!(matches!(result, Err(GraphStoreError::ConnectionError(_))));
    }
}
