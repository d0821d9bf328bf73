use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel(model.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// Errors caused by the caller's input rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownModel(_) | Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
