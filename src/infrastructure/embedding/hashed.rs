use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};

/// Bag-of-words feature hashing into a fixed number of dimensions.
///
/// Deterministic across runs and platforms, with no model download. Texts
/// sharing words score higher than texts that don't, which is enough for
/// local development and tests but carries no semantics beyond word overlap.
pub struct HashedEmbedding {
    dimension: usize,
}

impl HashedEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut vec = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::new(vec);
        }

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut index_bytes = [0u8; 8];
            index_bytes.copy_from_slice(&digest[..8]);
            let index = (u64::from_le_bytes(index_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vec[index] += sign;
        }

        Embedding::new(vec).normalized()
    }
}

#[async_trait]
impl EmbeddingService for HashedEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
