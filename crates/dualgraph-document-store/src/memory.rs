//! In-memory implementation of DocumentStorage
//!
//! This implementation is primarily intended for testing and development purposes.

use crate::{DocumentId, DocumentRecord, DocumentStorage, DocumentStoreError, DocumentStoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of DocumentStorage
///
/// Records are held as serialized JSON so reads behave like a real backend
/// (every `get` returns a fresh copy). All data is lost when the instance is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<HashMap<DocumentId, Vec<u8>>>>,
}

impl InMemoryDocumentStore {
    /// Create a new in-memory document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records regardless of type
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStorage for InMemoryDocumentStore {
    async fn upsert(&self, record: &DocumentRecord) -> DocumentStoreResult<()> {
        let data = serde_json::to_vec(record)?;

        let mut store = self.records.write().await;
        let replaced = store.insert(record.id.clone(), data).is_some();
        debug!(document_id = %record.id, replaced, "Upserted document record");

        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> DocumentStoreResult<DocumentRecord> {
        let store = self.records.read().await;

        match store.get(id) {
            Some(data) => Ok(serde_json::from_slice(data)?),
            None => Err(DocumentStoreError::NotFound(id.clone())),
        }
    }

    async fn exists(&self, id: &DocumentId) -> DocumentStoreResult<bool> {
        let store = self.records.read().await;
        Ok(store.contains_key(id))
    }

    async fn delete(&self, id: &DocumentId) -> DocumentStoreResult<()> {
        let mut store = self.records.write().await;
        store.remove(id);
        Ok(())
    }

    async fn count_by_type(&self, record_type: &str) -> DocumentStoreResult<usize> {
        let store = self.records.read().await;
        let mut count = 0;
        for data in store.values() {
            let record: DocumentRecord = serde_json::from_slice(data)?;
            if record.record_type == record_type {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Convert to Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any where Self: 'static {
        self
    }
}
