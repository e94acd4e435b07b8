//! Dualgraph Document Store
//!
//! Provides abstractions and implementations for the document half of a dual API
//! account. The DocumentStorage trait defines a contract for upserting flat
//! document records keyed by a content-derived identifier.

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use std::fmt::{Debug, Display};

/// Record type tag written on every flat document record.
pub const DOCUMENT_RECORD_TYPE: &str = "document";

/// Identifier of a document record: the lowercase hex SHA-256 digest of its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Constructor ensures format (64 lowercase hex chars)
    pub fn new(id: String) -> Result<Self, DocumentStoreError> {
        let well_formed = id.len() == 64
            && id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(DocumentStoreError::InvalidId(id));
        }
        Ok(Self(id))
    }

    /// Derive the identifier for a piece of content.
    pub fn for_content(content: &[u8]) -> Self {
        Self(sha256_hex(content))
    }

    /// Derive the identifier from the compact JSON serialization of a value.
    pub fn for_json(value: &serde_json::Value) -> Result<Self, DocumentStoreError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::for_content(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Flat record mirrored into the document store for every ingested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    /// Full nested content of the source document.
    pub content: serde_json::Value,
    #[serde(rename = "type")]
    pub record_type: String,
    /// Partition key value shared with the graph side of the account.
    pub pk: String,
    /// Vertex ids derived from the document, in emission order.
    #[serde(default)]
    pub concept_ids: Vec<String>,
}

impl DocumentRecord {
    /// Builds a `type: "document"` record whose id is derived from `content`.
    pub fn from_content(
        content: serde_json::Value,
        pk: impl Into<String>,
        concept_ids: Vec<String>,
    ) -> Result<Self, DocumentStoreError> {
        let id = DocumentId::for_json(&content)?;
        Ok(Self {
            id,
            content,
            record_type: DOCUMENT_RECORD_TYPE.to_string(),
            pk: pk.into(),
            concept_ids,
        })
    }
}

/// Errors that can occur during document store operations
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    #[error("Document not found for id: {0}")]
    NotFound(DocumentId),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}

/// Result type for DocumentStorage operations
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// Trait defining the contract for document storage implementations
#[async_trait]
pub trait DocumentStorage: Send + Sync + std::fmt::Debug {
    /// Inserts the record, replacing any existing record with the same id.
    async fn upsert(&self, record: &DocumentRecord) -> DocumentStoreResult<()>;

    /// Retrieve a record by id
    async fn get(&self, id: &DocumentId) -> DocumentStoreResult<DocumentRecord>;

    /// Check if a record exists
    async fn exists(&self, id: &DocumentId) -> DocumentStoreResult<bool>;

    /// Delete a record by id. Deleting a missing record is not an error.
    async fn delete(&self, id: &DocumentId) -> DocumentStoreResult<()>;

    /// Number of records carrying the given `type` tag.
    async fn count_by_type(&self, record_type: &str) -> DocumentStoreResult<usize>;

    /// Convert to Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any where Self: 'static;
}

// Re-export modules so they can be used from other crates
pub mod memory;
pub use memory::InMemoryDocumentStore;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_validation() {
        assert!(DocumentId::new("a".repeat(64)).is_ok());
        assert!(DocumentId::new("A".repeat(64)).is_err());
        assert!(DocumentId::new("abc".to_string()).is_err());

        match DocumentId::new("zz".to_string()) {
            Err(DocumentStoreError::InvalidId(id)) => assert_eq!(id, "zz"),
            other => panic!("Expected InvalidId, got {:?}", other),
        }
    }

    #[test]
    fn test_serialization_failure_converts_into_store_error() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: DocumentStoreError = bad.into();
        match error {
            DocumentStoreError::SerializationError(_) => {},
            DocumentStoreError::NotFound(_)
            | DocumentStoreError::InvalidId(_)
            | DocumentStoreError::Timeout(_) => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_document_id_is_stable_for_same_content() {
        let a = DocumentId::for_json(&json!({"a": {"b": [1, 2]}})).unwrap();
        let b = DocumentId::for_json(&json!({"a": {"b": [1, 2]}})).unwrap();
        let c = DocumentId::for_json(&json!({"a": {"b": [2, 1]}})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(DocumentId::new(a.clone().into_string()).is_ok());
    }

    #[test]
    fn test_record_serializes_type_tag() {
        let record = DocumentRecord::from_content(json!({}), "concept", vec![]).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "document");
        assert_eq!(value["pk"], "concept");
        assert_eq!(value["id"], sha256_hex(b"{}"));
    }
}
