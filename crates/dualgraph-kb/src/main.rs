use std::{path::Path, sync::Arc};

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use dualgraph_kb::{
    config::AppConfig,
    create_graph_store,
    data::{Document, TraceContext},
    init_tracing,
    projection::GraphProjector,
    services::{IngestionClient, IngestionMessage, IngestionService, Ingestor},
    storage::InMemoryDocumentStore,
    DocumentStorage,
};

fn parse_document(path: &Path, contents: &str) -> anyhow::Result<Document> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let document = match extension.as_deref() {
        Some("yaml") | Some("yml") => Document::from_yaml_str(contents),
        _ => Document::from_json_str(contents),
    };
    document.with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing first, so warnings about invalid settings reach the log
    dotenv::dotenv().ok();
    init_tracing(&AppConfig::bootstrap_log_level(|key| std::env::var(key).ok()));
    let config = AppConfig::load().context("Failed to load configuration")?;

    let Some(file) = std::env::args().nth(1) else {
        bail!("usage: dualgraph-ingest <document.json|document.yaml>");
    };
    let path = Path::new(&file);

    for mismatch in config.verify_dual_api() {
        tracing::warn!(%mismatch, "Document and Gremlin settings disagree");
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = parse_document(path, &contents)?;

    // Handles are built once here and shared by every ingestion
    let graph_store = create_graph_store(&config)?;
    let document_store = Arc::new(InMemoryDocumentStore::new());
    let ingestor = Ingestor::new(
        GraphProjector::new(config.limits()),
        document_store.clone(),
        Arc::clone(&graph_store),
    );

    let (ingestion_tx, ingestion_rx) = mpsc::channel::<IngestionMessage>(16);
    let mut ingestion_service = IngestionService::new(ingestor, ingestion_rx);
    let service_handle = tokio::spawn(async move {
        if let Err(e) = ingestion_service.run().await {
            tracing::error!("Ingestion service error: {:?}", e);
        }
    });

    let client = IngestionClient::new(ingestion_tx);
    let report = client
        .ingest(document, Some(path.display().to_string()))
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    drop(client);
    service_handle.await.context("Ingestion service task failed")?;

    let trace_ctx = TraceContext::new_root();
    let vertices = graph_store
        .vertex_count(&trace_ctx)
        .await
        .context("Failed to count vertices")?;
    let documents = document_store
        .count_by_type(dualgraph_document_store::DOCUMENT_RECORD_TYPE)
        .await
        .context("Failed to count documents")?;

    tracing::info!(
        document_id = %report.document_id,
        vertices_submitted = report.vertices_submitted,
        edges_submitted = report.edges_submitted,
        graph_vertices = vertices,
        document_records = documents,
        "Ingestion complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
