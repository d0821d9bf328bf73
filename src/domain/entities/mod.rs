mod chat;
mod document;
mod embedding;
mod job;
mod model;

pub use chat::{ChatInteractionState, MessageRef};
pub use document::{content_id, QueryHit, StoredDocument};
pub use embedding::Embedding;
pub use job::{BackgroundJob, JobEnvelope};
pub use model::{EmbeddingModel, EmbeddingModelConfig};
