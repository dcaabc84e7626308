use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::api::{NotReadyResponse, ResultResponse, StatusResponse, SubmitResponse};
use crate::models::job::{ImageOperation, JobOutcome, JobRecord};
use crate::services::blob_store::StorageError;
use crate::services::queue::{QueueError, QueuedJob};
use crate::services::registry::RegistryError;

const ALLOWED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Errors surfaced on the HTTP boundary as `{code, message}` JSON.
///
/// Processing errors never appear here: they are captured inside the job
/// and show up on the next status poll.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid file type. Only JPEG and PNG are allowed.")]
    InvalidMediaType,

    #[error("Multipart upload must include a named file field.")]
    MissingFile,

    #[error("Malformed multipart request.")]
    BadMultipart,

    #[error("Processed image not found.")]
    ResultMissing,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidMediaType => "invalid_media_type",
            Self::MissingFile => "missing_file",
            Self::BadMultipart => "bad_multipart",
            Self::ResultMissing => "result_missing",
            Self::Storage(_) | Self::Queue(_) | Self::Registry(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidMediaType | Self::MissingFile | Self::BadMultipart => {
                StatusCode::BAD_REQUEST
            }
            Self::ResultMissing => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Queue(_) | Self::Registry(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// POST /process-image/ — Upload an image and enqueue a processing job.
///
/// Validation happens before any side effect: a rejected upload writes no
/// file and creates no job. The response returns as soon as the job is
/// queued; it never waits for processing.
pub async fn submit_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut operation = ImageOperation::DEFAULT.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadMultipart)?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_owned);
                let filename = field.file_name().map(str::to_owned);
                let data = field.bytes().await.map_err(|_| ApiError::BadMultipart)?;

                if !content_type
                    .as_deref()
                    .is_some_and(|ct| ALLOWED_MEDIA_TYPES.contains(&ct))
                {
                    return Err(ApiError::InvalidMediaType);
                }

                let filename = filename.ok_or(ApiError::MissingFile)?;
                upload = Some((filename, data.to_vec()));
            }
            // Unknown operation names are accepted here; the worker turns
            // them into a failed job.
            Some("operation") => {
                operation = field.text().await.map_err(|_| ApiError::BadMultipart)?;
            }
            _ => {}
        }
    }

    let (filename, data) = upload.ok_or(ApiError::MissingFile)?;

    // Uploads are keyed by the client-supplied filename: a repeat upload
    // overwrites the previous one (last write wins).
    let input_path = state.blob_store.save_upload(&filename, &data).await?;
    let input_path = input_path.to_string_lossy().into_owned();

    let job_id = Uuid::new_v4();
    let record = JobRecord::new(job_id, input_path.clone(), operation.clone());
    state.registry.create(&record).await?;
    state
        .queue
        .enqueue(&QueuedJob { job_id, input_path: input_path.clone(), operation })
        .await?;

    metrics::counter!("image_jobs_total").increment(1);
    tracing::info!(job_id = %job_id, input_path = %input_path, "Image job submitted");

    Ok(Json(SubmitResponse {
        task_id: job_id,
        message: "Image processing started".to_string(),
    }))
}

/// GET /task-status/{task_id} — Poll job state.
///
/// An unknown id reads as pending: the broker-backed registry cannot tell
/// "never submitted" from "not started yet", and the reference behavior is
/// kept deliberately.
pub async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let outcome = state
        .registry
        .get(task_id)
        .await?
        .map(|record| record.outcome)
        .unwrap_or(JobOutcome::Pending);

    let (result, message) = match &outcome {
        JobOutcome::Success { result } => (Some(result.clone()), None),
        JobOutcome::Failure { message } => (None, Some(message.clone())),
        JobOutcome::Pending | JobOutcome::Running => (None, None),
    };

    Ok(Json(StatusResponse {
        task_id,
        status: outcome.status_str(),
        result,
        message,
    }))
}

/// GET /task-result/{task_id} — Retrieve the processed image path.
///
/// 404 only when the job succeeded but its file is gone (data loss); any
/// not-yet-successful state is a 200 with the current status, not an error.
pub async fn get_task_result(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let outcome = state
        .registry
        .get(task_id)
        .await?
        .map(|record| record.outcome)
        .unwrap_or(JobOutcome::Pending);

    match outcome {
        JobOutcome::Success { result } => {
            if state.blob_store.exists(std::path::Path::new(&result)).await {
                Ok(Json(ResultResponse { task_id, processed_image: result }).into_response())
            } else {
                Err(ApiError::ResultMissing)
            }
        }
        other => {
            Ok(Json(NotReadyResponse { task_id, status: other.status_str() }).into_response())
        }
    }
}
