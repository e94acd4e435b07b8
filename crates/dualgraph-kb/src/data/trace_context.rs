//! Correlation ids for one ingestion and the store calls it makes

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies an ingestion (`trace_id`) and the individual step within it
/// (`span_id`). Store calls receive a child of the ingestion's context, so a
/// failing statement can be tied back to its document in the logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub parent_id: Option<String>,
}

impl TraceContext {
    pub fn new_root() -> Self {
        Self::with_trace_id(Uuid::new_v4().to_string())
    }

    /// Root context continuing a trace started elsewhere, e.g. by an upstream caller.
    pub fn with_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: None,
        }
    }

    /// Same trace, fresh span, parented to this one.
    pub fn new_child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Uuid::new_v4().to_string(),
            parent_id: Some(self.span_id.clone()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new_root()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trace_id, self.span_id)
    }
}
