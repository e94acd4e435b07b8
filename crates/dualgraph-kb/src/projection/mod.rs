//! Projection of nested documents into concept vertices and containment edges.

pub mod gremlin;

use std::collections::HashSet;

use dualgraph_document_store::DocumentRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::{
    document::Document,
    errors::CoreError,
    identifiers::VertexId,
    types::{Edge, GraphStatement, Vertex, DOCUMENT_PARTITION_KEY},
};

pub use gremlin::GremlinScript;

/// Guards against unbounded recursion and runaway documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionLimits {
    /// Deepest mapping allowed; the root mapping is depth 1.
    pub max_depth: usize,
    /// Maximum number of mapping keys visited across all levels.
    pub max_keys: usize,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_keys: 10_000,
        }
    }
}

/// Output of a projection: one flat record and the ordered graph statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub record: DocumentRecord,
    pub statements: Vec<GraphStatement>,
}

impl Projection {
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.statements.iter().filter_map(GraphStatement::as_vertex)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.statements.iter().filter_map(GraphStatement::as_edge)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}

/// Converts documents into graph statements plus a mirrored document record.
///
/// Stateless: the projector holds only its limits, and every call works on an
/// immutable input and returns freshly allocated output.
#[derive(Debug, Clone, Default)]
pub struct GraphProjector {
    limits: ProjectionLimits,
}

impl GraphProjector {
    pub fn new(limits: ProjectionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ProjectionLimits {
        self.limits
    }

    /// Walks the document depth-first in pre-order.
    ///
    /// Each key yields an upsert-vertex statement the first time its id is
    /// seen, then an upsert-edge from its parent key when it is nested. A
    /// vertex statement therefore always precedes every edge that references it.
    pub fn project(&self, document: &Document) -> Result<Projection, CoreError> {
        let root = document.root()?;

        let mut walk = Walk::new(self.limits);
        walk.visit_mapping(root, None, 1)?;

        let record = DocumentRecord::from_content(
            document.content().clone(),
            DOCUMENT_PARTITION_KEY,
            walk.concept_ids,
        )
        .map_err(|e| CoreError::Internal(format!("failed to build document record: {}", e)))?;

        debug!(
            document_id = %record.id,
            statements = walk.statements.len(),
            keys = walk.keys_visited,
            "Projected document"
        );

        Ok(Projection {
            record,
            statements: walk.statements,
        })
    }
}

struct Walk {
    limits: ProjectionLimits,
    statements: Vec<GraphStatement>,
    emitted: HashSet<VertexId>,
    concept_ids: Vec<String>,
    keys_visited: usize,
}

impl Walk {
    fn new(limits: ProjectionLimits) -> Self {
        Self {
            limits,
            statements: Vec::new(),
            emitted: HashSet::new(),
            concept_ids: Vec::new(),
            keys_visited: 0,
        }
    }

    fn visit_mapping(
        &mut self,
        mapping: &Map<String, Value>,
        parent: Option<&VertexId>,
        depth: usize,
    ) -> Result<(), CoreError> {
        if depth > self.limits.max_depth {
            return Err(CoreError::DocumentTooDeep {
                depth,
                limit: self.limits.max_depth,
            });
        }

        for (key, value) in mapping {
            self.keys_visited += 1;
            if self.keys_visited > self.limits.max_keys {
                return Err(CoreError::DocumentTooLarge {
                    limit: self.limits.max_keys,
                });
            }

            let vertex = Vertex::concept(key);
            let current = vertex.id.clone();

            // Same key name anywhere in the document shares one vertex.
            if self.emitted.insert(current.clone()) {
                self.concept_ids.push(current.to_string());
                self.statements.push(GraphStatement::UpsertVertex(vertex));
            }

            if let Some(parent_id) = parent {
                self.statements.push(GraphStatement::UpsertEdge(Edge::contains(
                    parent_id.clone(),
                    current.clone(),
                )));
            }

            if let Value::Object(child) = value {
                self.visit_mapping(child, Some(&current), depth + 1)?;
            }
        }

        Ok(())
    }
}
