use redis::AsyncCommands;
use uuid::Uuid;

use crate::models::job::{JobOutcome, JobRecord};

const JOB_KEY_PREFIX: &str = "image_tasks:job:";

/// Key-value store of job state, one JSON record per job id.
///
/// The API service writes the initial Pending record at submission; every
/// later transition comes from exactly one worker invocation per id
/// (single-writer), so read-modify-write here needs no locking. Reads come
/// from arbitrarily many concurrent API requests and observe whatever was
/// last written.
pub struct JobRegistry {
    client: redis::Client,
}

impl JobRegistry {
    pub fn new(redis_url: &str) -> Result<Self, RegistryError> {
        let client = redis::Client::open(redis_url).map_err(RegistryError::Redis)?;
        Ok(Self { client })
    }

    fn key(job_id: Uuid) -> String {
        format!("{JOB_KEY_PREFIX}{job_id}")
    }

    /// Store a freshly created record. Overwrites any previous record for
    /// the same id.
    pub async fn create(&self, record: &JobRecord) -> Result<(), RegistryError> {
        self.put(record).await
    }

    /// Fetch a record. Unknown ids are `Ok(None)`, not an error.
    pub async fn get(&self, job_id: Uuid) -> Result<Option<JobRecord>, RegistryError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(RegistryError::Redis)?;
        let payload: Option<String> =
            conn.get(Self::key(job_id)).await.map_err(RegistryError::Redis)?;

        match payload {
            Some(json) => {
                let record: JobRecord =
                    serde_json::from_str(&json).map_err(RegistryError::Serialize)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Transition a job to a new outcome, refreshing `updated_at`.
    ///
    /// A missing record (registry flushed between submit and processing)
    /// is rebuilt from the queue payload fields supplied by the caller.
    pub async fn transition(
        &self,
        job_id: Uuid,
        input_path: &str,
        operation: &str,
        outcome: JobOutcome,
    ) -> Result<(), RegistryError> {
        let mut record = match self.get(job_id).await? {
            Some(record) => record,
            None => JobRecord::new(job_id, input_path.to_string(), operation.to_string()),
        };
        record.outcome = outcome;
        record.updated_at = chrono::Utc::now();
        self.put(&record).await
    }

    async fn put(&self, record: &JobRecord) -> Result<(), RegistryError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(RegistryError::Redis)?;
        let payload = serde_json::to_string(record).map_err(RegistryError::Serialize)?;
        conn.set::<_, _, ()>(Self::key(record.id), payload)
            .await
            .map_err(RegistryError::Redis)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
