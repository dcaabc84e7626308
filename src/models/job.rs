use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Image transform applied by the worker.
///
/// Parsed from the job's operation string at processing time, not at
/// submission: an unrecognized name becomes a failed job, never an HTTP
/// error on the upload path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOperation {
    Grayscale,
    Resize,
}

impl ImageOperation {
    pub const DEFAULT: &'static str = "grayscale";
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported operation: {0}")]
pub struct UnsupportedOperation(pub String);

impl FromStr for ImageOperation {
    type Err = UnsupportedOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grayscale" => Ok(Self::Grayscale),
            "resize" => Ok(Self::Resize),
            other => Err(UnsupportedOperation(other.to_string())),
        }
    }
}

/// State of a job, carrying its payload where one exists.
///
/// Result and error are mutually exclusive by construction; neither exists
/// while the job is pending or running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Pending,
    Running,
    Success { result: String },
    Failure { message: String },
}

impl JobOutcome {
    /// Wire-level status string, shared by every response shape.
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure { .. })
    }
}

/// A job as stored in the registry.
///
/// Created by the API service at submission time (outcome = Pending) and
/// transitioned exclusively by the worker afterwards. Records are never
/// deleted; retention is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub input_path: String,
    pub operation: String,
    #[serde(flatten)]
    pub outcome: JobOutcome,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(id: Uuid, input_path: String, operation: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            input_path,
            operation,
            outcome: JobOutcome::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derive the processed output path for an input: `<processed_dir>/<basename>`.
///
/// Two inputs sharing a basename therefore overwrite each other's output.
/// Known correctness gap, kept deliberately (last write wins).
///
/// `None` when the input has no final path component (e.g. ends in `..`).
/// The upload path never produces such inputs, but queue payloads are not
/// under this module's control.
pub fn processed_path(processed_dir: &Path, input_path: &Path) -> Option<std::path::PathBuf> {
    input_path.file_name().map(|name| processed_dir.join(name))
}
