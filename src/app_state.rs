use std::sync::Arc;

use crate::services::{blob_store::BlobStore, queue::JobQueue, registry::JobRegistry};

/// Shared application state passed to all route handlers and the worker.
#[derive(Clone)]
pub struct AppState {
    pub blob_store: Arc<BlobStore>,
    pub queue: Arc<JobQueue>,
    pub registry: Arc<JobRegistry>,
}

impl AppState {
    pub fn new(blob_store: BlobStore, queue: JobQueue, registry: JobRegistry) -> Self {
        Self {
            blob_store: Arc::new(blob_store),
            queue: Arc::new(queue),
            registry: Arc::new(registry),
        }
    }
}
