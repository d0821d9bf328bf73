pub mod config;
pub mod embedding;
pub mod llm;
pub mod queue;
pub mod slack;
pub mod telemetry;
pub mod vector_store;
pub mod wiring;

pub use config::{AppConfig, Config, PromptsConfig, SlackTexts};
pub use embedding::{HashedEmbedding, TextEmbedding};
pub use llm::OpenAiCompletion;
pub use queue::{create_pool, queues, InlineDispatcher, QueueError, RedisJobQueue, RedisPool};
pub use slack::SlackClient;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
pub use wiring::{build_dispatcher, Components};
