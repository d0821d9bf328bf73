use std::sync::Arc;

use crate::application::services::{AppendTextService, ChatInteractionService};
use crate::domain::{BackgroundJob, JobEnvelope};

/// Executes background jobs. Every outcome is handled inside the job itself,
/// so `execute` has nothing to return.
pub struct JobRunner {
    chat: Arc<ChatInteractionService>,
    ingestion: Arc<AppendTextService>,
}

impl JobRunner {
    pub fn new(chat: Arc<ChatInteractionService>, ingestion: Arc<AppendTextService>) -> Self {
        Self { chat, ingestion }
    }

    pub async fn execute(&self, envelope: JobEnvelope) {
        tracing::info!(
            job_id = %envelope.job_id,
            kind = envelope.job.kind(),
            queue_latency_ms = envelope.queue_latency_ms(),
            "running job"
        );

        match &envelope.job {
            BackgroundJob::ChatCommand { channel_id, text } => {
                self.chat.run(channel_id, text).await;
            }
            BackgroundJob::AppendText { payload } => {
                self.ingestion.handle(payload).await;
            }
        }

        tracing::info!(job_id = %envelope.job_id, "job finished");
    }
}
