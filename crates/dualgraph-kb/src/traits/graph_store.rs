//! GraphStore trait definition for graph database interaction

use async_trait::async_trait;
use std::any::Any;

use crate::data::{
    errors::GraphStoreError,
    trace_context::TraceContext,
    types::GraphStatement,
};

/// Represents the interface for submitting statements to the graph side of the account.
/// This abstracts the underlying technology (a Gremlin endpoint, or memory in tests).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Submits a single statement.
    ///
    /// Contract: each call is independently atomic; there is no transaction
    /// spanning several statements. Statements are upserts, so submitting the
    /// same statement twice leaves the graph unchanged. Returns the result rows
    /// reported by the store (empty when nothing matched).
    async fn submit(
        &self,
        trace_ctx: &TraceContext,
        statement: &GraphStatement,
    ) -> Result<Vec<serde_json::Value>, GraphStoreError>;

    /// Number of vertices currently in the graph.
    async fn vertex_count(&self, trace_ctx: &TraceContext) -> Result<u64, GraphStoreError>;

    /// Returns `self` as an `&dyn Any` for downcasting to concrete type.
    fn as_any(&self) -> &dyn Any;
}
