use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::future::Future;

use crate::domain::{ports::VectorStore, DomainError, Embedding, QueryHit, StoredDocument};

const TEXT_KEY: &str = "text";

/// Resolves a create-collection attempt. A failed create still succeeds when
/// the collection exists afterwards, since another caller won the race.
/// Returns whether this caller created it.
async fn settle_create<E, F>(created: Result<(), E>, exists_now: F) -> Result<bool, DomainError>
where
    E: std::fmt::Display,
    F: Future<Output = Result<bool, DomainError>>,
{
    match created {
        Ok(()) => Ok(true),
        Err(e) => {
            if exists_now.await? {
                Ok(false)
            } else {
                Err(DomainError::store(e.to_string()))
            }
        }
    }
}

pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(url: &str) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(Self { client })
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, DomainError> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| DomainError::store(e.to_string()))
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, collection: &str, dimension: usize) -> Result<(), DomainError> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(collection).vectors_config(VectorParamsBuilder::new(
                    dimension as u64,
                    Distance::Cosine,
                )),
            )
            .await
            .map(|_| ());

        if settle_create(created, self.collection_exists(collection)).await? {
            tracing::info!(collection, dimension, "collection created");
        } else {
            tracing::debug!(collection, "collection created concurrently");
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, documents: &[StoredDocument]) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let points = documents
            .iter()
            .map(|doc| {
                let payload: Payload = serde_json::json!({ TEXT_KEY: doc.text })
                    .try_into()
                    .map_err(|_| DomainError::internal("Failed to create payload"))?;
                Ok(PointStruct::new(
                    doc.id.to_string(),
                    doc.embedding.as_slice().to_vec(),
                    payload,
                ))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<QueryHit>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.as_slice().to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| {
                let text = point.payload.get(TEXT_KEY)?.as_str()?.to_string();
                Some(QueryHit {
                    score: point.score,
                    text,
                })
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.client
            .health_check()
            .await
            .map(|_| ())
            .map_err(|e| DomainError::store(e.to_string()))
    }
}
