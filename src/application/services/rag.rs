use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DomainError, EmbeddingModel, EmbeddingModelConfig, QueryHit, StoredDocument,
};

/// Content-addressed indexing and similarity query over one collection per
/// embedding model.
///
/// Each model has exactly one embedder, used both to index and to query, so
/// stored vectors and query vectors always live in the same space.
pub struct RagService {
    embedders: HashMap<EmbeddingModel, Arc<dyn EmbeddingService>>,
    vector_store: Arc<dyn VectorStore>,
}

impl RagService {
    pub fn new(vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedders: HashMap::new(),
            vector_store,
        }
    }

    pub fn with_embedder(
        mut self,
        model: EmbeddingModel,
        embedder: Arc<dyn EmbeddingService>,
    ) -> Self {
        self.embedders.insert(model, embedder);
        self
    }

    /// The model's embedder, provided it produces vectors of the size the
    /// model's collection is created with.
    fn embedder(&self, model: EmbeddingModel) -> Result<&Arc<dyn EmbeddingService>, DomainError> {
        let embedder = self
            .embedders
            .get(&model)
            .ok_or_else(|| DomainError::unknown_model(model.id()))?;

        let expected = model.config().dimension;
        if embedder.dimension() != expected {
            return Err(DomainError::embedding(format!(
                "{model} embedder produces {}-dim vectors, collection expects {expected}",
                embedder.dimension()
            )));
        }
        Ok(embedder)
    }

    async fn ensure_collection(
        &self,
        model: EmbeddingModel,
    ) -> Result<EmbeddingModelConfig, DomainError> {
        let config = model.config();
        self.vector_store
            .ensure_collection(config.collection, config.dimension)
            .await?;
        Ok(config)
    }

    /// Embeds and upserts `texts` into the model's collection, returning the
    /// content ids in input order.
    #[instrument(skip(self, texts), fields(model = %model, count = texts.len()))]
    pub async fn index(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> Result<Vec<Uuid>, DomainError> {
        let embedder = self.embedder(model)?;
        let config = self.ensure_collection(model).await?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = embedder.embed_batch(&refs).await?;
        if embeddings.len() != texts.len() {
            return Err(DomainError::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let documents = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                if embedding.dimension() != config.dimension {
                    return Err(DomainError::embedding(format!(
                        "{model} produced a {}-dim vector, collection {} expects {}",
                        embedding.dimension(),
                        config.collection,
                        config.dimension
                    )));
                }
                Ok(StoredDocument::new(text.clone(), embedding))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.vector_store
            .upsert(config.collection, &documents)
            .await?;

        tracing::debug!(collection = config.collection, "documents upserted");
        Ok(documents.into_iter().map(|d| d.id).collect())
    }

    /// Indexes `texts` under every registered model. Stops at the first
    /// failing model; models already indexed keep their documents.
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn index_all(&self, texts: &[String]) -> Result<(), DomainError> {
        for model in EmbeddingModel::ALL {
            self.index(model, texts).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, query), fields(model = %model))]
    pub async fn query(
        &self,
        model: EmbeddingModel,
        query: &str,
        limit: usize,
    ) -> Result<Vec<QueryHit>, DomainError> {
        let embedder = self.embedder(model)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let config = self.ensure_collection(model).await?;
        let embedding = embedder.embed(query).await?;

        let mut hits = self
            .vector_store
            .search(config.collection, &embedding, limit)
            .await?;
        hits.truncate(limit);

        tracing::debug!(hits = hits.len(), "query completed");
        Ok(hits)
    }
}

/// Joins hit texts with newlines, keeping score order.
pub fn join_context(hits: &[QueryHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
