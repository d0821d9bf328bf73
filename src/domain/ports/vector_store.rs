use crate::domain::{errors::DomainError, Embedding, QueryHit, StoredDocument};
use async_trait::async_trait;

/// A similarity-searchable store partitioned into named collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection if it does not exist yet. Losing a creation
    /// race to another caller counts as success.
    async fn ensure_collection(&self, collection: &str, dimension: usize)
        -> Result<(), DomainError>;

    /// Inserts or overwrites documents by id.
    async fn upsert(&self, collection: &str, documents: &[StoredDocument])
        -> Result<(), DomainError>;

    /// Returns at most `limit` hits ordered by descending cosine score.
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<QueryHit>, DomainError>;

    async fn health_check(&self) -> Result<(), DomainError>;
}
