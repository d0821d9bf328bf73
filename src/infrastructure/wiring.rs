use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    AnswerService, AppendTextService, ChatInteractionService, JobRunner, RagPrompt, RagService,
};
use crate::domain::ports::{
    ChatPlatform, CompletionService, EmbeddingService, JobDispatcher, VectorStore,
};
use crate::domain::EmbeddingModel;
use crate::infrastructure::config::{
    AppConfig, EmbeddingBackend, QueueBackend, VectorStoreBackend,
};
use crate::infrastructure::{
    create_pool, HashedEmbedding, InMemoryVectorStore, InlineDispatcher, OpenAiCompletion,
    QdrantVectorStore, RedisJobQueue, SlackClient, TextEmbedding,
};

/// Every long-lived service, built once at startup and shared by handle.
#[derive(Clone)]
pub struct Components {
    pub rag: Arc<RagService>,
    pub answer: Arc<AnswerService>,
    pub chat: Arc<dyn ChatPlatform>,
    pub runner: Arc<JobRunner>,
    pub vector_store: Arc<dyn VectorStore>,
}

impl Components {
    /// Wires the application services around already-built adapters.
    pub fn assemble(
        config: &AppConfig,
        vector_store: Arc<dyn VectorStore>,
        embedders: impl IntoIterator<Item = (EmbeddingModel, Arc<dyn EmbeddingService>)>,
        completion: Arc<dyn CompletionService>,
        chat: Arc<dyn ChatPlatform>,
    ) -> Self {
        let rag = Arc::new(
            embedders
                .into_iter()
                .fold(RagService::new(vector_store.clone()), |rag, (model, embedder)| {
                    rag.with_embedder(model, embedder)
                }),
        );
        let prompt = RagPrompt::new(&config.prompts.rag_template);
        let job_timeout = Duration::from_secs(config.config.worker.job_timeout_seconds);

        let answer = Arc::new(AnswerService::new(
            rag.clone(),
            completion.clone(),
            prompt.clone(),
            config.config.rag.answer_limit,
        ));

        let interaction = Arc::new(
            ChatInteractionService::new(
                chat.clone(),
                rag.clone(),
                completion,
                prompt,
                config.prompts.chat.clone(),
            )
            .with_model(config.config.rag.chat_model)
            .with_limit(config.config.rag.chat_limit)
            .with_timeout(job_timeout),
        );
        let ingestion = Arc::new(
            AppendTextService::new(chat.clone(), rag.clone(), config.prompts.ingestion.clone())
                .with_timeout(job_timeout),
        );
        let runner = Arc::new(JobRunner::new(interaction, ingestion));

        Self {
            rag,
            answer,
            chat,
            runner,
            vector_store,
        }
    }

    /// Builds the adapters selected by `config`, reading secrets from the
    /// environment.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let vector_store: Arc<dyn VectorStore> = match config.config.vector_store.backend {
            VectorStoreBackend::Qdrant => {
                Arc::new(QdrantVectorStore::new(&config.config.vector_store.url)?)
            }
            VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
        };

        let embedders = match config.config.embedding.backend {
            EmbeddingBackend::Openai => {
                require_env("OPENAI_API_KEY")?;
                EmbeddingModel::ALL
                    .into_iter()
                    .map(|model| {
                        let embedder: Arc<dyn EmbeddingService> =
                            Arc::new(TextEmbedding::for_model(model));
                        (model, embedder)
                    })
                    .collect::<Vec<_>>()
            }
            EmbeddingBackend::Hashed => EmbeddingModel::ALL
                .into_iter()
                .map(|model| {
                    let embedder: Arc<dyn EmbeddingService> =
                        Arc::new(HashedEmbedding::new(model.config().dimension));
                    (model, embedder)
                })
                .collect(),
        };

        let completion = Arc::new(
            OpenAiCompletion::from_config(&config.config.llm, require_env("OPENAI_API_KEY")?)?
                .with_system_prompt(&config.prompts.system),
        );
        let chat = Arc::new(SlackClient::new(
            &config.config.slack.api_base_url,
            require_env("SLACK_BOT_TOKEN")?,
        ));

        Ok(Self::assemble(config, vector_store, embedders, completion, chat))
    }
}

/// Picks where detached jobs run according to `worker.backend`.
pub fn build_dispatcher(
    config: &AppConfig,
    runner: Arc<JobRunner>,
) -> anyhow::Result<Arc<dyn JobDispatcher>> {
    Ok(match config.config.worker.backend {
        QueueBackend::Inline => Arc::new(InlineDispatcher::new(runner)),
        QueueBackend::Redis => {
            let pool = create_pool(&config.config.worker.redis_url)?;
            Arc::new(RedisJobQueue::new(pool))
        }
    })
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}
