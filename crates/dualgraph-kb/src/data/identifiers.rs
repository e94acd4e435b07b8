//! Identifier types for graph elements

use dualgraph_document_store::sha256_hex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a concept vertex.
///
/// Derived from the key string alone (lowercase hex SHA-256 of its UTF-8
/// bytes), so the same key name maps to the same vertex wherever it appears.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl VertexId {
    pub fn for_key(key: &str) -> Self {
        Self(sha256_hex(key.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<VertexId> for String {
    fn from(id: VertexId) -> Self {
        id.0
    }
}
