//! Rendering of graph statements as parameterized Gremlin scripts.
//!
//! Values never appear in the script text; they travel as bindings so keys
//! containing quotes or traversal syntax cannot alter the traversal.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::types::{Edge, GraphStatement, Vertex};

/// Upsert of a concept vertex: reuse the vertex with this id or add it.
const UPSERT_VERTEX: &str = "g.V(vid).fold().coalesce(unfold(), \
    addV(vlabel).property('id', vid).property('name', vname).property('pk', vpk))";

/// Upsert of an edge: reuse an existing edge with the same label and endpoints or add it.
/// Yields nothing when either endpoint is missing.
const UPSERT_EDGE: &str = "g.V(from_id).as('p').V(to_id).coalesce(\
    inE(elabel).where(outV().as('p')), addE(elabel).from('p'))";

/// Script that counts the vertices the graph holds.
pub const VERTEX_COUNT: &str = "g.V().count()";

/// A Gremlin script with its parameter bindings, in the shape of a Gremlin
/// Server HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GremlinScript {
    pub gremlin: String,
    pub bindings: Map<String, Value>,
}

impl GremlinScript {
    pub fn new(gremlin: impl Into<String>) -> Self {
        Self {
            gremlin: gremlin.into(),
            bindings: Map::new(),
        }
    }

    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.to_string(), value.into());
        self
    }

    pub fn vertex_count() -> Self {
        Self::new(VERTEX_COUNT)
    }
}

impl From<&Vertex> for GremlinScript {
    fn from(vertex: &Vertex) -> Self {
        GremlinScript::new(UPSERT_VERTEX)
            .bind("vid", vertex.id.as_str())
            .bind("vlabel", vertex.label.as_str())
            .bind("vname", vertex.name.as_str())
            .bind("vpk", vertex.pk.as_str())
    }
}

impl From<&Edge> for GremlinScript {
    fn from(edge: &Edge) -> Self {
        GremlinScript::new(UPSERT_EDGE)
            .bind("from_id", edge.from_id.as_str())
            .bind("to_id", edge.to_id.as_str())
            .bind("elabel", edge.label.as_str())
    }
}

impl From<&GraphStatement> for GremlinScript {
    fn from(statement: &GraphStatement) -> Self {
        match statement {
            GraphStatement::UpsertVertex(vertex) => vertex.into(),
            GraphStatement::UpsertEdge(edge) => edge.into(),
        }
    }
}
