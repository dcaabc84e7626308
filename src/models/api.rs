use serde::Serialize;
use uuid::Uuid;

/// Response after submitting an image for processing.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub task_id: Uuid,
    pub message: String,
}

/// Response for polling job status.
///
/// `result` is present only on success, `message` only on failure.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub task_id: Uuid,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for retrieving a completed result.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub task_id: Uuid,
    pub processed_image: String,
}

/// Returned by the result endpoint when the job has not succeeded yet.
#[derive(Debug, Serialize)]
pub struct NotReadyResponse {
    pub task_id: Uuid,
    pub status: &'static str,
}
