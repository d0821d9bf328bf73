use async_trait::async_trait;
use std::sync::Arc;

use crate::application::JobRunner;
use crate::domain::{ports::JobDispatcher, BackgroundJob, DomainError, JobEnvelope};

/// Runs jobs as detached tasks on the current tokio runtime.
///
/// Every job gets its own task and nothing is shared between runs, so a run
/// stuck on a slow collaborator never holds up another one. Each run is
/// bounded by the job timeout applied inside the services.
#[derive(Clone)]
pub struct InlineDispatcher {
    runner: Arc<JobRunner>,
}

impl InlineDispatcher {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobDispatcher for InlineDispatcher {
    async fn dispatch(&self, job: BackgroundJob) -> Result<(), DomainError> {
        let envelope = JobEnvelope::new(job);
        tracing::info!(job_id = %envelope.job_id, kind = envelope.job.kind(), "job dispatched");

        let runner = self.runner.clone();
        tokio::spawn(async move {
            runner.execute(envelope).await;
        });

        Ok(())
    }
}
