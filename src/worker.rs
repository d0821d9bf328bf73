use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use rag_slack::application::JobRunner;
use rag_slack::infrastructure::{create_pool, telemetry, AppConfig, Components, RedisJobQueue};

const POP_TIMEOUT_SECS: f64 = 1.0;

/// Pulls jobs off the Redis queue and runs each one in its own task.
pub struct JobConsumer {
    queue: RedisJobQueue,
    runner: Arc<JobRunner>,
}

impl JobConsumer {
    pub fn new(queue: RedisJobQueue, runner: Arc<JobRunner>) -> Self {
        Self { queue, runner }
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        tracing::info!("consumer started");

        loop {
            let envelope = match self.queue.pop(POP_TIMEOUT_SECS).await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "failed to pop job");
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    continue;
                }
            };

            let runner = self.runner.clone();
            tokio::spawn(async move {
                runner.execute(envelope).await;
            });
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("worker=debug,rag_slack=debug");

    let config = AppConfig::load()?;

    let pool = create_pool(&config.config.worker.redis_url)?;
    info!("Redis pool initialized");

    let components = Components::from_config(&config)?;
    info!("Services initialized");

    let consumer = JobConsumer::new(RedisJobQueue::new(pool), components.runner);

    info!(
        job_timeout_seconds = config.config.worker.job_timeout_seconds,
        "worker started"
    );
    consumer.start().await
}
