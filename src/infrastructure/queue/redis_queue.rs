use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};

use crate::domain::{ports::JobDispatcher, BackgroundJob, DomainError, JobEnvelope};
use crate::infrastructure::queue::queues;

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueueError>;

pub fn create_pool(redis_url: &str) -> Result<RedisPool> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| QueueError::Pool(e.to_string()))
}

/// Job queue on a Redis list, shared by the API (producer) and the worker
/// (consumer).
#[derive(Clone)]
pub struct RedisJobQueue {
    pool: RedisPool,
}

impl RedisJobQueue {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| QueueError::Pool(e.to_string()))
    }

    pub async fn push(&self, envelope: &JobEnvelope) -> Result<()> {
        let payload = serde_json::to_string(envelope)?;
        let mut conn = self.conn().await?;

        conn.lpush::<_, _, ()>(queues::BACKGROUND_QUEUE, payload)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        tracing::info!(job_id = %envelope.job_id, kind = envelope.job.kind(), "job queued");
        Ok(())
    }

    /// Blocks up to `timeout_secs` for the next job.
    pub async fn pop(&self, timeout_secs: f64) -> Result<Option<JobEnvelope>> {
        let mut conn = self.conn().await?;

        let result: Option<(String, String)> = conn
            .brpop(queues::BACKGROUND_QUEUE, timeout_secs)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        result
            .map(|(_queue, json)| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }
}

#[async_trait]
impl JobDispatcher for RedisJobQueue {
    async fn dispatch(&self, job: BackgroundJob) -> std::result::Result<(), DomainError> {
        self.push(&JobEnvelope::new(job))
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
