//! Retrieval-augmented question answering over Qdrant, served over HTTP and
//! as a Slack slash command.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
