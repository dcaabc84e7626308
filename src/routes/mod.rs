pub mod health;
pub mod metrics;
pub mod process;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// API routes sharing `AppState`. The metrics scrape route carries its own
/// state and is attached by the server binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Static UI (embedded at compile time)
        .route("/", get(|| async { Html(include_str!("../../static/index.html")) }))
        .route("/health", get(health::health_check))
        .route("/process-image/", post(process::submit_image))
        .route("/task-status/{task_id}", get(process::get_task_status))
        .route("/task-result/{task_id}", get(process::get_task_result))
        .with_state(state)
}
