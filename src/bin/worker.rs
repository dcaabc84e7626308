use tracing_subscriber::EnvFilter;

use image_tasks::app_state::AppState;
use image_tasks::config::AppConfig;
use image_tasks::services::{blob_store::BlobStore, queue::JobQueue, registry::JobRegistry};
use image_tasks::worker;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting image processing worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize services
    tracing::info!("Initializing services");
    let blob_store = BlobStore::new(&config.upload_dir, &config.processed_dir)
        .await
        .expect("Failed to initialize blob store");

    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize job queue");
    let registry = JobRegistry::new(&config.redis_url).expect("Failed to initialize job registry");

    let state = AppState::new(blob_store, queue, registry);

    tracing::info!("Worker ready, starting job processing loop");

    worker::run(&state).await;
}
