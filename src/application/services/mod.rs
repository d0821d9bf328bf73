mod answer;
mod chat;
mod ingestion;
mod prompt;
mod rag;
mod runner;

pub use answer::AnswerService;
pub use chat::{ChatInteractionService, ChatTexts};
pub use ingestion::{AppendTextService, IngestionTexts, Modal};
pub use prompt::RagPrompt;
pub use rag::{join_context, RagService};
pub use runner::JobRunner;
