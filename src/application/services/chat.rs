use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::application::services::{join_context, RagPrompt, RagService};
use crate::application::template::render;
use crate::domain::{
    ports::{ChatPlatform, CompletionService},
    ChatInteractionState, DomainError, EmbeddingModel,
};

/// User-visible texts posted while a chat interaction runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatTexts {
    /// Echo of the question; `{question}`.
    pub question: String,
    pub searching: String,
    /// Retrieved context; `{context}`.
    pub context: String,
    pub generating: String,
    pub completed: String,
    /// Answer used when nothing was retrieved; `{question}`.
    pub no_results: String,
    /// Untracked failure notice; `{error}`.
    pub error: String,
}

impl Default for ChatTexts {
    fn default() -> Self {
        Self {
            question: "*Question:* {question}".to_string(),
            searching: ":mag: Searching related documents...".to_string(),
            context: "*Retrieved context*\n```\n{context}\n```".to_string(),
            generating: ":hourglass_flowing_sand: Asking the LLM...".to_string(),
            completed: ":white_check_mark: Completed.".to_string(),
            no_results: "No information found for {question}.".to_string(),
            error: ":warning: An error occurred while processing your request: {error}"
                .to_string(),
        }
    }
}

/// Drives one slash-command question through the channel:
///
/// 1. post the question (message A)
/// 2. reply in A's thread with a searching status (message B)
/// 3. retrieve context
/// 4. reply in A's thread with the context
/// 5. switch B to the generating status
/// 6. drain the completion, or use the no-results answer on empty context
/// 7. replace A with the answer
/// 8. switch B to the completed status
///
/// Steps run strictly in order and at most once. Nothing escapes [`run`]:
/// a failure after step 1 becomes a fresh channel message, and so does a run
/// that outlives its timeout.
///
/// [`run`]: ChatInteractionService::run
pub struct ChatInteractionService {
    chat: Arc<dyn ChatPlatform>,
    rag: Arc<RagService>,
    completion: Arc<dyn CompletionService>,
    prompt: RagPrompt,
    texts: ChatTexts,
    model: EmbeddingModel,
    limit: usize,
    timeout: Duration,
}

impl ChatInteractionService {
    pub fn new(
        chat: Arc<dyn ChatPlatform>,
        rag: Arc<RagService>,
        completion: Arc<dyn CompletionService>,
        prompt: RagPrompt,
        texts: ChatTexts,
    ) -> Self {
        Self {
            chat,
            rag,
            completion,
            prompt,
            texts,
            model: EmbeddingModel::default(),
            limit: 3,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Bounds steps 2 to 8; an overrun is reported like any other failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip(self, text), fields(channel_id = %channel_id))]
    pub async fn run(&self, channel_id: &str, text: &str) {
        let mut state = ChatInteractionState::new(channel_id);

        let question_text = render(&self.texts.question, &[("question", text)]);
        match self.chat.post_message(channel_id, &question_text, None).await {
            Ok(message) => state.question = Some(message),
            Err(e) => {
                tracing::error!(error = %e, "could not post question, abandoning interaction");
                return;
            }
        }

        let outcome = tokio::time::timeout(self.timeout, self.drive(&mut state, text))
            .await
            .unwrap_or_else(|_| {
                Err(DomainError::internal(format!(
                    "no answer within {:?}",
                    self.timeout
                )))
            });

        if let Err(e) = outcome {
            tracing::error!(error = %e, "chat interaction failed");
            let notice = render(&self.texts.error, &[("error", &e.to_string())]);
            if let Err(post_err) = self
                .chat
                .post_message(&state.channel_id, &notice, None)
                .await
            {
                tracing::error!(error = %post_err, "could not post error notice");
            }
            return;
        }

        tracing::info!(fragments = state.fragments.len(), "chat interaction completed");
    }

    async fn drive(&self, state: &mut ChatInteractionState, text: &str) -> Result<(), DomainError> {
        let question = state
            .question
            .clone()
            .ok_or_else(|| DomainError::internal("question message was never posted"))?;

        let status = self
            .chat
            .post_message(&state.channel_id, &self.texts.searching, Some(&question.ts))
            .await?;
        state.status = Some(status);

        let hits = self.rag.query(self.model, text, self.limit).await?;
        let context = join_context(&hits);
        tracing::debug!(hits = hits.len(), "context retrieved");

        let context_text = render(&self.texts.context, &[("context", &context)]);
        self.chat
            .post_message(&state.channel_id, &context_text, Some(&question.ts))
            .await?;

        self.set_status(state, &self.texts.generating).await?;

        if context.is_empty() {
            state.push_fragment(render(&self.texts.no_results, &[("question", text)]));
        } else {
            let prompt = self.prompt.build(text, &context);
            let mut fragments = self.completion.stream(&prompt);
            while let Some(fragment) = fragments.next().await {
                state.push_fragment(fragment?);
            }
        }

        self.chat.update_message(&question, &state.response()).await?;
        self.set_status(state, &self.texts.completed).await
    }

    async fn set_status(&self, state: &ChatInteractionState, text: &str) -> Result<(), DomainError> {
        match &state.status {
            Some(status) => self.chat.update_message(status, text).await,
            None => Ok(()),
        }
    }
}
