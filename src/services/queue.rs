use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const QUEUE_KEY: &str = "image_tasks:jobs";
const PROCESSING_KEY: &str = "image_tasks:processing";

/// Job payload serialized into Redis.
///
/// The operation travels as the raw string the client supplied; the worker
/// is the one place that interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub job_id: Uuid,
    pub input_path: String,
    pub operation: String,
}

/// Redis-backed FIFO job queue decoupling submission from execution.
///
/// Delivery is at-least-once: a dequeued job sits in a processing list
/// until `complete` removes it, so a worker crash mid-job leaves the
/// payload visible for manual intervention.
pub struct JobQueue {
    client: redis::Client,
}

impl JobQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self { client })
    }

    /// Enqueue a processing job.
    pub async fn enqueue(&self, job: &QueuedJob) -> Result<(), QueueError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)?;
        let payload = serde_json::to_string(job).map_err(QueueError::Serialize)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Dequeue a job for processing (pop with move to the processing list).
    pub async fn dequeue(&self) -> Result<Option<QueuedJob>, QueueError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)?;
        let result: Option<String> = conn
            .rpoplpush(QUEUE_KEY, PROCESSING_KEY)
            .await
            .map_err(QueueError::Redis)?;

        match result {
            Some(payload) => {
                let job: QueuedJob =
                    serde_json::from_str(&payload).map_err(QueueError::Serialize)?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Get the current queue depth (pending jobs).
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)?;
        let depth: u64 = conn.llen(QUEUE_KEY).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }

    /// Mark a job as complete (remove from the processing list).
    pub async fn complete(&self, job: &QueuedJob) -> Result<(), QueueError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)?;
        let payload = serde_json::to_string(job).map_err(QueueError::Serialize)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
