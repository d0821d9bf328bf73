use async_trait::async_trait;

use crate::domain::{errors::DomainError, BackgroundJob};

/// Hands a job to background execution. Returns once the job is accepted,
/// never after it runs; the caller gets no view of the outcome.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch(&self, job: BackgroundJob) -> Result<(), DomainError>;
}
