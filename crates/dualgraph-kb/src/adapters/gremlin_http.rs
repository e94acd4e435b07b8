use std::{any::Any, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    data::{errors::GraphStoreError, GraphStatement, TraceContext},
    projection::GremlinScript,
    traits::GraphStore,
};

/// Configuration for the HTTP Gremlin store
#[derive(Debug, Clone)]
pub struct GremlinHttpConfig {
    /// Gremlin Server HTTP endpoint, e.g. `http://localhost:8182`
    pub endpoint: String,
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for GremlinHttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8182".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Graph store that posts parameterized scripts to a Gremlin Server HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpGremlinStore {
    config: GremlinHttpConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GremlinStatus {
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GremlinResult {
    #[serde(default)]
    data: Value,
}

/// Response body of a Gremlin Server HTTP request
#[derive(Debug, Deserialize)]
struct GremlinResponse {
    status: GremlinStatus,
    result: Option<GremlinResult>,
}

impl HttpGremlinStore {
    pub fn new(config: GremlinHttpConfig) -> Result<Self, GraphStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphStoreError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn with_url_and_timeout(
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, GraphStoreError> {
        Self::new(GremlinHttpConfig {
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Maps an HTTP error to a GraphStoreError
    fn map_http_error(&self, error: reqwest::Error) -> GraphStoreError {
        if error.is_timeout() {
            GraphStoreError::ConnectionError(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            GraphStoreError::ConnectionError(format!("Connection error: {}", error))
        } else {
            GraphStoreError::ConnectionError(format!("HTTP error: {}", error))
        }
    }

    async fn execute(&self, script: &GremlinScript) -> Result<Vec<Value>, GraphStoreError> {
        let response = self.client.post(&self.config.endpoint)
            .json(script)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let body: GremlinResponse = response.json()
                    .await
                    .map_err(|e| GraphStoreError::MappingError(format!("Failed to parse response: {}", e)))?;

                // 204 inside the body means "no content", still a success
                match body.status.code {
                    200 | 204 | 206 => Ok(body.result.map(|r| into_rows(r.data)).unwrap_or_default()),
                    code => Err(GraphStoreError::QueryError(format!(
                        "Gremlin status {}: {}", code, body.status.message
                    ))),
                }
            },
            status => {
                let error_body = response.text().await
                    .unwrap_or_else(|_| format!("HTTP error: {}", status));
                Err(GraphStoreError::QueryError(format!("HTTP {}: {}", status.as_u16(), error_body)))
            }
        }
    }
}

/// Unwraps GraphSON typed lists; plain JSON arrays pass through.
fn into_rows(data: Value) -> Vec<Value> {
    match data {
        Value::Array(rows) => rows,
        Value::Object(mut map) if map.contains_key("@value") => {
            match map.remove("@value") {
                Some(Value::Array(rows)) => rows,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        },
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Reads a count from either a bare number or a GraphSON `g:Int64`.
fn as_count(row: &Value) -> Option<u64> {
    row.as_u64()
        .or_else(|| row.get("@value").and_then(Value::as_u64))
}

#[async_trait]
impl GraphStore for HttpGremlinStore {
    #[instrument(skip(self, statement), fields(trace_id = %trace_ctx.trace_id))]
    async fn submit(
        &self,
        trace_ctx: &TraceContext,
        statement: &GraphStatement,
    ) -> Result<Vec<Value>, GraphStoreError> {
        let script = GremlinScript::from(statement);
        debug!(gremlin = %script.gremlin, "Submitting statement");
        self.execute(&script).await
    }

    #[instrument(skip(self), fields(trace_id = %trace_ctx.trace_id))]
    async fn vertex_count(&self, trace_ctx: &TraceContext) -> Result<u64, GraphStoreError> {
        let rows = self.execute(&GremlinScript::vertex_count()).await?;
        rows.first()
            .and_then(as_count)
            .ok_or_else(|| GraphStoreError::MappingError(format!("Unexpected count result: {:?}", rows)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
