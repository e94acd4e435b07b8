//! Graph element types produced by projection

use serde::{Deserialize, Serialize};

use super::identifiers::VertexId;

/// Label of every vertex derived from a document key.
pub const CONCEPT_LABEL: &str = "concept";
/// Label of the parent -> child containment edge.
pub const CONTAINS_LABEL: &str = "contains";
/// Partition key value written on concept vertices.
pub const CONCEPT_PARTITION_KEY: &str = "concept";
/// Partition key value written on flat document records.
pub const DOCUMENT_PARTITION_KEY: &str = "document";

/// A concept vertex derived from one mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: String,
    /// The originating key.
    pub name: String,
    pub pk: String,
}

impl Vertex {
    pub fn concept(key: &str) -> Self {
        Self {
            id: VertexId::for_key(key),
            label: CONCEPT_LABEL.to_string(),
            name: key.to_string(),
            pk: CONCEPT_PARTITION_KEY.to_string(),
        }
    }
}

/// A directed edge between two concept vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub label: String,
    pub from_id: VertexId,
    pub to_id: VertexId,
}

impl Edge {
    pub fn contains(from_id: VertexId, to_id: VertexId) -> Self {
        Self {
            label: CONTAINS_LABEL.to_string(),
            from_id,
            to_id,
        }
    }
}

/// A single graph-store instruction. Each statement is an idempotent upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphStatement {
    UpsertVertex(Vertex),
    UpsertEdge(Edge),
}

impl GraphStatement {
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            GraphStatement::UpsertVertex(vertex) => Some(vertex),
            GraphStatement::UpsertEdge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            GraphStatement::UpsertEdge(edge) => Some(edge),
            GraphStatement::UpsertVertex(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concept_vertex() {
        let vertex = Vertex::concept("Price Discovery");
        assert_eq!(vertex.label, "concept");
        assert_eq!(vertex.name, "Price Discovery");
        assert_eq!(vertex.pk, "concept");
        assert_eq!(vertex.id, VertexId::for_key("Price Discovery"));
    }

    #[test]
    fn test_statement_serialization_is_tagged() {
        let edge = Edge::contains(VertexId::for_key("a"), VertexId::for_key("b"));
        let value = serde_json::to_value(GraphStatement::UpsertEdge(edge.clone())).unwrap();

        assert_eq!(
            value,
            json!({
                "kind": "upsert_edge",
                "label": "contains",
                "from_id": edge.from_id.as_str(),
                "to_id": edge.to_id.as_str(),
            })
        );
    }
}
