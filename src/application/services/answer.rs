use std::sync::Arc;
use tracing::instrument;

use crate::application::services::{join_context, RagPrompt, RagService};
use crate::domain::{
    ports::{CompletionService, FragmentStream},
    DomainError, EmbeddingModel,
};

/// Synchronous question answering: retrieve, build the prompt, stream the
/// completion back unchanged.
pub struct AnswerService {
    rag: Arc<RagService>,
    completion: Arc<dyn CompletionService>,
    prompt: RagPrompt,
    limit: usize,
}

impl AnswerService {
    pub fn new(
        rag: Arc<RagService>,
        completion: Arc<dyn CompletionService>,
        prompt: RagPrompt,
        limit: usize,
    ) -> Self {
        Self {
            rag,
            completion,
            prompt,
            limit,
        }
    }

    /// Retrieval runs before this returns, so its failures surface as an
    /// error rather than inside the fragment stream. An empty context still
    /// goes to the model.
    #[instrument(skip(self, question), fields(model = %model, limit = self.limit))]
    pub async fn answer(
        &self,
        question: &str,
        model: EmbeddingModel,
    ) -> Result<FragmentStream, DomainError> {
        let hits = self.rag.query(model, question, self.limit).await?;
        let context = join_context(&hits);
        if context.is_empty() {
            tracing::debug!("no context retrieved, asking the model without it");
        }

        let prompt = self.prompt.build(question, &context);
        Ok(self.completion.stream(&prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{HashedEmbedding, InMemoryVectorStore};
    use futures::{stream, StreamExt};
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoCompletion {
        prompts: Mutex<Vec<String>>,
    }

    impl CompletionService for EchoCompletion {
        fn stream(&self, prompt: &str) -> FragmentStream {
            self.prompts.lock().unwrap().push(prompt.to_string());
            stream::iter(vec![Ok("An".to_string()), Ok("swer".to_string())]).boxed()
        }
    }

    fn rag() -> Arc<RagService> {
        Arc::new(
            RagService::new(Arc::new(InMemoryVectorStore::new()))
                .with_embedder(EmbeddingModel::BgeM3, Arc::new(HashedEmbedding::new(1024))),
        )
    }

    #[tokio::test]
    async fn test_answer_forwards_fragments_and_uses_context() {
        let rag = rag();
        rag.index(
            EmbeddingModel::BgeM3,
            &["Paris is the capital of France.".to_string()],
        )
        .await
        .unwrap();

        let completion = Arc::new(EchoCompletion::default());
        let service = AnswerService::new(
            rag,
            completion.clone(),
            RagPrompt::new("{question}|{context}"),
            10,
        );

        let fragments: Vec<String> = service
            .answer("capital of France?", EmbeddingModel::BgeM3)
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["An", "swer"]);
        let prompts = completion.prompts.lock().unwrap();
        assert_eq!(
            prompts.as_slice(),
            ["capital of France?|Paris is the capital of France."]
        );
    }

    #[tokio::test]
    async fn test_answer_with_empty_store_still_calls_model() {
        let completion = Arc::new(EchoCompletion::default());
        let service = AnswerService::new(
            rag(),
            completion.clone(),
            RagPrompt::new("{question}|{context}"),
            10,
        );

        let stream = service.answer("anything", EmbeddingModel::BgeM3).await;
        assert!(stream.is_ok());
        assert_eq!(
            completion.prompts.lock().unwrap().as_slice(),
            ["anything|"]
        );
    }

    #[tokio::test]
    async fn test_answer_surfaces_unknown_model_before_streaming() {
        let completion = Arc::new(EchoCompletion::default());
        let service = AnswerService::new(
            rag(),
            completion.clone(),
            RagPrompt::new("{question}"),
            10,
        );

        let result = service.answer("q", EmbeddingModel::MiniLm).await;
        assert!(matches!(result, Err(DomainError::UnknownModel(_))));
        assert!(completion.prompts.lock().unwrap().is_empty());
    }
}
