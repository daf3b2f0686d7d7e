use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use grovesync::config::WorkerConfig;
use grovesync::embed::{Embedder, OpenAiEmbedder};
use grovesync::ingest::{Annotator, Processor, Reconciler};
use grovesync::provider::{DriveClient, StorageProvider};
use grovesync::server::{self, AppState};
use grovesync::store::{MetadataStore, RestStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = WorkerConfig::from_env()?;

    let provider: Arc<dyn StorageProvider> =
        Arc::new(DriveClient::new(&config.drive_api_base, &config.drive_token)?);
    let store: Arc<dyn MetadataStore> =
        Arc::new(RestStore::new(&config.store_url, &config.store_key)?);

    let embedder: Option<Arc<dyn Embedder>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiEmbedder::new(&config.openai_api_base, key)?)),
        None => None,
    };
    let annotator = Annotator::new(embedder);

    let reconciler = Reconciler::new(provider.clone(), store.clone(), annotator);
    let processor = Arc::new(Processor::new(
        provider,
        reconciler,
        config.root_folder_id.clone(),
    ));

    let state = AppState {
        processor,
        store,
        trigger_token: config.trigger_token.clone(),
        has_embeddings: config.has_embeddings(),
    };

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        has_embeddings = config.has_embeddings(),
        "grovesync worker listening"
    );
    axum::serve(listener, server::router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
    tracing::info!("shutdown signal received");
}
