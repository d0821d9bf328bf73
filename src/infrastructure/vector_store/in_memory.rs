use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ports::VectorStore, DomainError, Embedding, QueryHit, StoredDocument};

struct Collection {
    dimension: usize,
    documents: HashMap<Uuid, (String, Embedding)>,
}

/// Process-local store with exact cosine scoring, keyed by document id.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, |c| c.documents.len()))
            .unwrap_or(0)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, dimension: usize) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                dimension,
                documents: HashMap::new(),
            });
        Ok(())
    }

    async fn upsert(&self, collection: &str, documents: &[StoredDocument]) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let target = collections
            .get_mut(collection)
            .ok_or_else(|| DomainError::store(format!("collection {collection} not found")))?;

        if let Some(doc) = documents
            .iter()
            .find(|d| d.embedding.dimension() != target.dimension)
        {
            return Err(DomainError::store(format!(
                "vector dimension {} does not match collection dimension {}",
                doc.embedding.dimension(),
                target.dimension
            )));
        }

        for doc in documents {
            target
                .documents
                .insert(doc.id, (doc.text.clone(), doc.embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<QueryHit>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let target = collections
            .get(collection)
            .ok_or_else(|| DomainError::store(format!("collection {collection} not found")))?;

        let mut scored: Vec<(Uuid, QueryHit)> = target
            .documents
            .iter()
            .map(|(id, (text, embedding))| {
                (
                    *id,
                    QueryHit {
                        score: query.cosine_similarity(embedding),
                        text: text.clone(),
                    },
                )
            })
            .collect();

        // Id breaks score ties so equal inputs always give the same order.
        scored.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(scored.into_iter().take(limit).map(|(_, hit)| hit).collect())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
