use serde::{Deserialize, Serialize};

/// Address of a posted chat message: the channel plus the platform's message
/// timestamp, which doubles as the message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

/// Per-run state of one chat interaction. Lives only inside the background
/// task that drives it.
#[derive(Debug, Clone)]
pub struct ChatInteractionState {
    pub channel_id: String,
    pub question: Option<MessageRef>,
    pub status: Option<MessageRef>,
    pub fragments: Vec<String>,
}

impl ChatInteractionState {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            question: None,
            status: None,
            fragments: Vec::new(),
        }
    }

    pub fn push_fragment(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn response(&self) -> String {
        self.fragments.concat()
    }
}
