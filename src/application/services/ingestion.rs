use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::application::services::RagService;
use crate::application::template::render;
use crate::domain::{ports::ChatPlatform, DomainError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionTexts {
    pub modal_title: String,
    pub modal_label: String,
    pub modal_submit: String,
    pub modal_close: String,
    /// Direct message after indexing; `{text}`.
    pub success: String,
    /// Direct message when indexing fails; `{error}`.
    pub failure: String,
}

impl Default for IngestionTexts {
    fn default() -> Self {
        Self {
            modal_title: "Add knowledge".to_string(),
            modal_label: "Text to add".to_string(),
            modal_submit: "Save".to_string(),
            modal_close: "Cancel".to_string(),
            success: "Saved to the knowledge base:\n>{text}".to_string(),
            failure: "Could not save your text: {error}".to_string(),
        }
    }
}

/// Identifiers tying a modal view to the submissions it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modal {
    pub callback_id: &'static str,
    pub block_id: &'static str,
    pub action_id: &'static str,
}

impl Modal {
    pub const APPEND_TEXT: Modal = Modal {
        callback_id: "append_text_modal",
        block_id: "append_text_block",
        action_id: "append_text_input",
    };

    /// Slack Block Kit definition of the text-entry modal.
    pub fn view(&self, texts: &IngestionTexts) -> serde_json::Value {
        json!({
            "type": "modal",
            "callback_id": self.callback_id,
            "title": { "type": "plain_text", "text": texts.modal_title },
            "submit": { "type": "plain_text", "text": texts.modal_submit },
            "close": { "type": "plain_text", "text": texts.modal_close },
            "blocks": [{
                "type": "input",
                "block_id": self.block_id,
                "label": { "type": "plain_text", "text": texts.modal_label },
                "element": {
                    "type": "plain_text_input",
                    "action_id": self.action_id,
                    "multiline": true
                }
            }]
        })
    }
}

#[derive(Debug, Deserialize)]
struct InteractionPayload {
    #[serde(rename = "type")]
    kind: String,
    user: Option<PayloadUser>,
    view: Option<PayloadView>,
}

#[derive(Debug, Deserialize)]
struct PayloadUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PayloadView {
    #[serde(default)]
    callback_id: String,
    #[serde(default)]
    state: ViewState,
}

#[derive(Debug, Default, Deserialize)]
struct ViewState {
    #[serde(default)]
    values: HashMap<String, HashMap<String, InputValue>>,
}

#[derive(Debug, Deserialize)]
struct InputValue {
    value: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct Submission {
    user_id: String,
    text: String,
}

/// `Ok(None)` means the payload is well-formed but not ours.
fn parse_submission(payload: &str, modal: &Modal) -> Result<Option<Submission>, DomainError> {
    let payload: InteractionPayload =
        serde_json::from_str(payload).map_err(|e| DomainError::malformed(e.to_string()))?;

    if payload.kind != "view_submission" {
        return Ok(None);
    }
    let Some(view) = payload.view else {
        return Ok(None);
    };
    if view.callback_id != modal.callback_id {
        return Ok(None);
    }

    let user_id = payload
        .user
        .map(|u| u.id)
        .ok_or_else(|| DomainError::malformed("submission has no user"))?;

    let text = view
        .state
        .values
        .get(modal.block_id)
        .and_then(|block| block.get(modal.action_id))
        .and_then(|input| input.value.clone())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| DomainError::malformed("submission has no text"))?;

    Ok(Some(Submission { user_id, text }))
}

/// Handles modal submissions: indexes the submitted text under every
/// embedding model and tells the submitter how it went.
pub struct AppendTextService {
    chat: Arc<dyn ChatPlatform>,
    rag: Arc<RagService>,
    texts: IngestionTexts,
    modal: Modal,
    timeout: Duration,
}

impl AppendTextService {
    pub fn new(chat: Arc<dyn ChatPlatform>, rag: Arc<RagService>, texts: IngestionTexts) -> Self {
        Self {
            chat,
            rag,
            texts,
            modal: Modal::APPEND_TEXT,
            timeout: Duration::from_secs(120),
        }
    }

    /// Bounds the indexing step; an overrun is reported to the submitter.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, payload: &str) {
        let submission = match parse_submission(payload, &self.modal) {
            Ok(Some(submission)) => submission,
            Ok(None) => {
                tracing::debug!("ignoring unrelated interaction payload");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping interaction payload");
                return;
            }
        };

        let indexing = self.rag.index_all(std::slice::from_ref(&submission.text));
        let indexed = tokio::time::timeout(self.timeout, indexing)
            .await
            .unwrap_or_else(|_| {
                Err(DomainError::internal(format!(
                    "indexing did not finish within {:?}",
                    self.timeout
                )))
            });

        let notice = match indexed {
            Ok(()) => {
                tracing::info!(user_id = %submission.user_id, "submitted text indexed");
                render(&self.texts.success, &[("text", &submission.text)])
            }
            Err(e) => {
                tracing::error!(user_id = %submission.user_id, error = %e, "indexing submitted text failed");
                render(&self.texts.failure, &[("error", &e.to_string())])
            }
        };

        if let Err(e) = self
            .chat
            .send_direct_message(&submission.user_id, &notice)
            .await
        {
            tracing::error!(user_id = %submission.user_id, error = %e, "could not notify submitter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmbeddingModel, MessageRef};
    use crate::infrastructure::{HashedEmbedding, InMemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct DmRecorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatPlatform for DmRecorder {
        async fn post_message(
            &self,
            channel: &str,
            _text: &str,
            _thread_ts: Option<&str>,
        ) -> Result<MessageRef, DomainError> {
            Ok(MessageRef {
                channel: channel.to_string(),
                ts: "1".to_string(),
            })
        }

        async fn update_message(&self, _m: &MessageRef, _t: &str) -> Result<(), DomainError> {
            Ok(())
        }

        async fn open_view(&self, _t: &str, _v: serde_json::Value) -> Result<(), DomainError> {
            Ok(())
        }

        async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DomainError> {
            self.sent
                .lock()
                .unwrap()
                .push((user_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn submission_payload(callback_id: &str, text: &str) -> String {
        json!({
            "type": "view_submission",
            "user": { "id": "U123" },
            "view": {
                "callback_id": callback_id,
                "state": { "values": {
                    "append_text_block": { "append_text_input": { "type": "plain_text_input", "value": text } }
                }}
            }
        })
        .to_string()
    }

    fn setup() -> (Arc<DmRecorder>, Arc<InMemoryVectorStore>, AppendTextService) {
        let chat = Arc::new(DmRecorder::default());
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = EmbeddingModel::ALL
            .into_iter()
            .fold(RagService::new(store.clone()), |svc, model| {
                svc.with_embedder(model, Arc::new(HashedEmbedding::new(model.config().dimension)))
            });
        let texts = IngestionTexts {
            success: "saved: {text}".into(),
            ..Default::default()
        };
        let service = AppendTextService::new(chat.clone(), Arc::new(rag), texts);
        (chat, store, service)
    }

    #[test]
    fn test_parse_valid_submission() {
        let parsed = parse_submission(
            &submission_payload("append_text_modal", "new fact"),
            &Modal::APPEND_TEXT,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Some(Submission {
                user_id: "U123".into(),
                text: "new fact".into()
            })
        );
    }

    #[test]
    fn test_parse_ignores_other_events() {
        let block_action = json!({ "type": "block_actions", "user": { "id": "U1" } }).to_string();
        assert_eq!(parse_submission(&block_action, &Modal::APPEND_TEXT).unwrap(), None);

        let other_modal = submission_payload("other_modal", "x");
        assert_eq!(parse_submission(&other_modal, &Modal::APPEND_TEXT).unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = parse_submission("not json", &Modal::APPEND_TEXT).unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload(_)));

        let blank = submission_payload("append_text_modal", "   ");
        let err = parse_submission(&blank, &Modal::APPEND_TEXT).unwrap_err();
        assert!(matches!(err, DomainError::MalformedPayload(_)));
    }

    #[test]
    fn test_modal_view_carries_submission_ids() {
        let view = Modal::APPEND_TEXT.view(&IngestionTexts::default());
        assert_eq!(view["callback_id"], "append_text_modal");
        assert_eq!(view["blocks"][0]["block_id"], "append_text_block");
        assert_eq!(view["blocks"][0]["element"]["action_id"], "append_text_input");
    }

    #[tokio::test]
    async fn test_handle_indexes_every_model_and_notifies() {
        let (chat, store, service) = setup();

        service
            .handle(&submission_payload("append_text_modal", "new fact"))
            .await;

        assert_eq!(store.document_count("docs-baai"), 1);
        assert_eq!(store.document_count("docs-minilm"), 1);
        assert_eq!(
            chat.sent.lock().unwrap().as_slice(),
            [("U123".to_string(), "saved: new fact".to_string())]
        );
    }

    #[tokio::test]
    async fn test_handle_drops_malformed_without_notice() {
        let (chat, store, service) = setup();

        service.handle("{ broken").await;

        assert!(chat.sent.lock().unwrap().is_empty());
        assert_eq!(store.document_count("docs-baai"), 0);
    }

    struct StalledStore;

    #[async_trait]
    impl crate::domain::ports::VectorStore for StalledStore {
        async fn ensure_collection(&self, _c: &str, _d: usize) -> Result<(), DomainError> {
            futures::future::pending().await
        }

        async fn upsert(
            &self,
            _c: &str,
            _d: &[crate::domain::StoredDocument],
        ) -> Result<(), DomainError> {
            futures::future::pending().await
        }

        async fn search(
            &self,
            _c: &str,
            _q: &crate::domain::Embedding,
            _l: usize,
        ) -> Result<Vec<crate::domain::QueryHit>, DomainError> {
            futures::future::pending().await
        }

        async fn health_check(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_indexing_times_out_and_notifies() {
        let chat = Arc::new(DmRecorder::default());
        let rag = RagService::new(Arc::new(StalledStore))
            .with_embedder(EmbeddingModel::BgeM3, Arc::new(HashedEmbedding::new(1024)));
        let texts = IngestionTexts {
            failure: "failed: {error}".into(),
            ..Default::default()
        };
        let service = AppendTextService::new(chat.clone(), Arc::new(rag), texts)
            .with_timeout(Duration::from_millis(50));

        service
            .handle(&submission_payload("append_text_modal", "new fact"))
            .await;

        assert_eq!(
            chat.sent.lock().unwrap().as_slice(),
            [(
                "U123".to_string(),
                "failed: Internal error: indexing did not finish within 50ms".to_string()
            )]
        );
    }
}
