use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work that runs detached from the request that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundJob {
    ChatCommand { channel_id: String, text: String },
    AppendText { payload: String },
}

impl BackgroundJob {
    pub fn chat_command(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ChatCommand {
            channel_id: channel_id.into(),
            text: text.into(),
        }
    }

    pub fn append_text(payload: impl Into<String>) -> Self {
        Self::AppendText {
            payload: payload.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatCommand { .. } => "chat_command",
            Self::AppendText { .. } => "append_text",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub job_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub job: BackgroundJob,
}

impl JobEnvelope {
    pub fn new(job: BackgroundJob) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
            job,
        }
    }

    pub fn queue_latency_ms(&self) -> i64 {
        (Utc::now() - self.enqueued_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_json_shape() {
        let job = BackgroundJob::chat_command("C42", "hello");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "chat_command");
        assert_eq!(json["channel_id"], "C42");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn test_envelope_roundtrip_keeps_job() {
        let envelope = JobEnvelope::new(BackgroundJob::append_text("{}"));
        let json = serde_json::to_string(&envelope).unwrap();
        let back: JobEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id, envelope.job_id);
        assert_eq!(back.job, envelope.job);
    }
}
