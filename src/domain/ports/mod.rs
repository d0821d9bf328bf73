mod chat_platform;
mod completion;
mod dispatcher;
mod embedding;
mod vector_store;

pub use chat_platform::ChatPlatform;
pub use completion::{CompletionService, FragmentStream};
pub use dispatcher::JobDispatcher;
pub use embedding::EmbeddingService;
pub use vector_store::VectorStore;
