use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use tracing::debug;

use crate::data::{
    errors::GraphStoreError,
    identifiers::VertexId,
    trace_context::TraceContext,
    types::{Edge, GraphStatement, Vertex},
};
use crate::traits::GraphStore;

#[derive(Debug, Default)]
struct GraphState {
    vertices: HashMap<VertexId, Vertex>,
    edges: HashSet<Edge>,
    // Insertion order, kept for deterministic listing
    edge_order: Vec<Edge>,
}

/// In-memory graph store with the same upsert semantics as the Gremlin scripts:
/// a vertex is added once per id, an edge once per (label, from, to), and an
/// edge whose endpoints are missing matches nothing and is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    state: Arc<RwLock<GraphState>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&self, id: &VertexId) -> Option<Vertex> {
        self.state.read().vertices.get(id).cloned()
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        let mut vertices: Vec<Vertex> = self.state.read().vertices.values().cloned().collect();
        vertices.sort_by(|a, b| a.id.cmp(&b.id));
        vertices
    }

    /// Edges in the order they were first added
    pub fn edges(&self) -> Vec<Edge> {
        self.state.read().edge_order.clone()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edge_order.len()
    }

    /// Clear all data in the store
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.vertices.clear();
        state.edges.clear();
        state.edge_order.clear();
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn submit(
        &self,
        trace_ctx: &TraceContext,
        statement: &GraphStatement,
    ) -> Result<Vec<serde_json::Value>, GraphStoreError> {
        let mut state = self.state.write();

        match statement {
            GraphStatement::UpsertVertex(vertex) => {
                let stored = state
                    .vertices
                    .entry(vertex.id.clone())
                    .or_insert_with(|| vertex.clone());
                Ok(vec![serde_json::to_value(&*stored)
                    .map_err(|e| GraphStoreError::MappingError(e.to_string()))?])
            },
            GraphStatement::UpsertEdge(edge) => {
                if !state.vertices.contains_key(&edge.from_id) || !state.vertices.contains_key(&edge.to_id) {
                    debug!(trace_id = %trace_ctx.trace_id, from = %edge.from_id, to = %edge.to_id, "Edge endpoints missing, nothing matched");
                    return Ok(Vec::new());
                }
                if state.edges.insert(edge.clone()) {
                    state.edge_order.push(edge.clone());
                }
                Ok(vec![json!({
                    "label": edge.label,
                    "outV": edge.from_id,
                    "inV": edge.to_id,
                })])
            },
        }
    }

    async fn vertex_count(&self, _trace_ctx: &TraceContext) -> Result<u64, GraphStoreError> {
        Ok(self.state.read().vertices.len() as u64)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
