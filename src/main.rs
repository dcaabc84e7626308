use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use image_tasks::app_state::AppState;
use image_tasks::config::AppConfig;
use image_tasks::routes;
use image_tasks::services::{blob_store::BlobStore, queue::JobQueue, registry::JobRegistry};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing image-tasks server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_histogram!(
        "image_processing_seconds",
        "Time to process one image job"
    );
    metrics::describe_counter!("image_jobs_total", "Total image jobs submitted");
    metrics::describe_counter!("image_jobs_completed", "Total image jobs completed");
    metrics::describe_counter!("image_jobs_failed", "Total image jobs that failed");
    metrics::describe_gauge!(
        "image_queue_depth",
        "Current number of pending jobs in the queue"
    );

    // Bootstrap blob store directories
    tracing::info!(
        upload_dir = %config.upload_dir,
        processed_dir = %config.processed_dir,
        "Initializing blob store"
    );
    let blob_store = BlobStore::new(&config.upload_dir, &config.processed_dir)
        .await
        .expect("Failed to initialize blob store");

    // Initialize Redis job queue and registry
    tracing::info!("Connecting to Redis");
    let queue = JobQueue::new(&config.redis_url).expect("Failed to initialize job queue");
    let registry = JobRegistry::new(&config.redis_url).expect("Failed to initialize job registry");

    // Create shared application state
    let state = AppState::new(blob_store, queue, registry);

    // Build API routes
    let app = routes::api_router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            axum::routing::get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting image-tasks on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
