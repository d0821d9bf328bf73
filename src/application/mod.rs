//! Application layer - Use cases and orchestration.
//!
//! This module contains application services that orchestrate domain logic
//! and infrastructure. Services depend on domain ports (traits) rather than
//! concrete implementations.

pub mod services;
pub mod template;

pub use services::{
    join_context, AnswerService, AppendTextService, ChatInteractionService, ChatTexts,
    IngestionTexts, JobRunner, Modal, RagPrompt, RagService,
};
