use async_trait::async_trait;

use crate::domain::{errors::DomainError, MessageRef};

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Posts a message, optionally as a reply in the thread of `thread_ts`.
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<MessageRef, DomainError>;

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), DomainError>;

    /// Opens a modal view for the interaction identified by `trigger_id`.
    async fn open_view(&self, trigger_id: &str, view: serde_json::Value)
        -> Result<(), DomainError>;

    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DomainError>;
}
