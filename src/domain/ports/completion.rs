use futures::stream::BoxStream;

use crate::domain::errors::DomainError;

/// Ordered response fragments of one completion call.
pub type FragmentStream = BoxStream<'static, Result<String, DomainError>>;

pub trait CompletionService: Send + Sync {
    /// Starts a streaming completion for `prompt`. Nothing is sent until the
    /// stream is polled; each call issues a fresh request.
    fn stream(&self, prompt: &str) -> FragmentStream;
}
