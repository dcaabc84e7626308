use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::app_state::AppState;
use crate::models::job::JobOutcome;
use crate::services::codec::ImageCodec;
use crate::services::queue::{QueueError, QueuedJob};
use crate::services::registry::RegistryError;

const POLL_INTERVAL_MS: u64 = 1000; // 1 second

/// Infrastructure failures while driving a job. Codec failures are not
/// represented here; those become the job's Failure state instead.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Main processing loop: poll the queue, process jobs until shutdown.
pub async fn run(state: &AppState) {
    loop {
        match process_next_job(state).await {
            Ok(true) => {
                tracing::debug!("Job processed, checking for next job");
            }
            Ok(false) => {
                tracing::trace!("No jobs available, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error driving job, will retry polling");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Process the next job from the queue.
/// Returns Ok(true) if a job was processed, Ok(false) if no job available.
///
/// State machine per job: Pending → Running → Success(path) | Failure(msg).
/// There are no retries; one failure is terminal, and failed jobs write no
/// output file.
pub async fn process_next_job(state: &AppState) -> Result<bool, WorkerError> {
    let job = match state.queue.dequeue().await? {
        Some(j) => j,
        None => return Ok(false),
    };

    tracing::info!(
        job_id = %job.job_id,
        input_path = %job.input_path,
        operation = %job.operation,
        "Processing image job"
    );

    transition(state, &job, JobOutcome::Running).await?;

    // A queue payload whose input path has no final component cannot be
    // given an output path; that is a terminal failure, not a worker crash.
    let Some(output) = state.blob_store.processed_path(Path::new(&job.input_path)) else {
        let message = format!("input path has no filename: {}", job.input_path);
        transition(state, &job, JobOutcome::Failure { message: message.clone() }).await?;
        state.queue.complete(&job).await?;
        metrics::counter!("image_jobs_failed").increment(1);
        tracing::warn!(job_id = %job.job_id, error = %message, "Job failed");
        return Ok(true);
    };
    let start = Instant::now();

    match ImageCodec::process(PathBuf::from(&job.input_path), job.operation.clone(), output).await
    {
        Ok(path) => {
            let result = path.to_string_lossy().into_owned();
            transition(state, &job, JobOutcome::Success { result: result.clone() }).await?;
            state.queue.complete(&job).await?;

            metrics::counter!("image_jobs_completed").increment(1);
            metrics::histogram!("image_processing_seconds").record(start.elapsed().as_secs_f64());

            tracing::info!(
                job_id = %job.job_id,
                result = %result,
                duration_ms = start.elapsed().as_millis() as u64,
                "Job completed successfully"
            );
        }
        Err(e) => {
            transition(state, &job, JobOutcome::Failure { message: e.to_string() }).await?;
            state.queue.complete(&job).await?;

            metrics::counter!("image_jobs_failed").increment(1);

            tracing::warn!(job_id = %job.job_id, error = %e, "Job failed");
        }
    }

    if let Ok(depth) = state.queue.queue_depth().await {
        metrics::gauge!("image_queue_depth").set(depth as f64);
    }

    Ok(true)
}

async fn transition(
    state: &AppState,
    job: &QueuedJob,
    outcome: JobOutcome,
) -> Result<(), WorkerError> {
    state
        .registry
        .transition(job.job_id, &job.input_path, &job.operation, outcome)
        .await?;
    Ok(())
}
