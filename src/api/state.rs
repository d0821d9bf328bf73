use std::sync::Arc;

use crate::application::{AnswerService, RagService};
use crate::domain::ports::{ChatPlatform, JobDispatcher, VectorStore};
use crate::infrastructure::{AppConfig, Components};

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub answer: Arc<AnswerService>,
    pub chat: Arc<dyn ChatPlatform>,
    pub vector_store: Arc<dyn VectorStore>,
    pub dispatcher: Arc<dyn JobDispatcher>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(components: Components, dispatcher: Arc<dyn JobDispatcher>, config: AppConfig) -> Self {
        Self {
            rag: components.rag,
            answer: components.answer,
            chat: components.chat,
            vector_store: components.vector_store,
            dispatcher,
            config: Arc::new(config),
        }
    }
}
