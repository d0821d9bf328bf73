use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Identifier, collection name and vector size backing one embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingModelConfig {
    pub id: &'static str,
    pub collection: &'static str,
    pub dimension: usize,
}

/// The statically registered embedding models.
///
/// Each model owns its own collection; the same text indexed under two
/// models is stored twice, once per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmbeddingModel {
    #[default]
    #[serde(rename = "BAAI/bge-m3")]
    BgeM3,
    #[serde(rename = "paraphrase-multilingual-MiniLM-L12-v2")]
    MiniLm,
}

impl EmbeddingModel {
    pub const ALL: [EmbeddingModel; 2] = [EmbeddingModel::BgeM3, EmbeddingModel::MiniLm];

    pub fn id(&self) -> &'static str {
        match self {
            Self::BgeM3 => "BAAI/bge-m3",
            Self::MiniLm => "paraphrase-multilingual-MiniLM-L12-v2",
        }
    }

    pub fn config(&self) -> EmbeddingModelConfig {
        match self {
            Self::BgeM3 => EmbeddingModelConfig {
                id: self.id(),
                collection: "docs-baai",
                dimension: 1024,
            },
            Self::MiniLm => EmbeddingModelConfig {
                id: self.id(),
                collection: "docs-minilm",
                dimension: 384,
            },
        }
    }

}

/// Registry lookup by model identifier; anything unregistered is
/// [`DomainError::UnknownModel`].
impl FromStr for EmbeddingModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| DomainError::unknown_model(s))
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
