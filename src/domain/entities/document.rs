use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::Embedding;

/// Derives the point id for a text from its exact bytes.
///
/// The id is the first 128 bits of the SHA-256 digest. No normalization is
/// applied, so any byte difference (whitespace included) yields a new id.
pub fn content_id(text: &str) -> Uuid {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub text: String,
    pub embedding: Embedding,
}

impl StoredDocument {
    pub fn new(text: impl Into<String>, embedding: Embedding) -> Self {
        let text = text.into();
        Self {
            id: content_id(&text),
            text,
            embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub score: f32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_is_stable() {
        assert_eq!(content_id("hello"), content_id("hello"));
    }

    #[test]
    fn test_content_id_matches_truncated_hex_digest() {
        // sha256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        let expected = Uuid::parse_str("2cf24dba5fb0a30e26e83b2ac5b9e29e").unwrap();
        assert_eq!(content_id("hello"), expected);
    }

    #[test]
    fn test_content_id_is_byte_exact() {
        assert_ne!(content_id("hello"), content_id("hello "));
        assert_ne!(content_id("hello"), content_id("Hello"));
    }

    #[test]
    fn test_stored_document_uses_content_id() {
        let doc = StoredDocument::new("Paris", Embedding::new(vec![1.0]));
        assert_eq!(doc.id, content_id("Paris"));
    }
}
