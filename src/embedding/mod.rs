//! Embedding generation for semantic search and retrieval.

#[cfg(test)]
mod hashing;
mod local;
mod openai;

#[cfg(test)]
pub use hashing::HashingEmbedder;
pub use local::{FastEmbedder, DEFAULT_LOCAL_MODEL};
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{Result, SubragError};
use crate::openai::ApiKey;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
///
/// Implementations must map equal text to equal vectors within one process.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder selected in the settings.
///
/// The local model is only loaded on first use. The OpenAI provider needs an
/// API key; without one the model is unavailable.
pub fn create_embedder(
    settings: &EmbeddingSettings,
    api_key: Option<&ApiKey>,
) -> Result<Arc<dyn Embedder>> {
    match settings.provider {
        EmbeddingProvider::Local => Ok(Arc::new(FastEmbedder::with_model(&settings.local_model)?)),
        EmbeddingProvider::OpenAI => {
            let key = api_key.ok_or_else(|| {
                SubragError::EmbeddingUnavailable(
                    "the openai embedding provider needs an OpenAI API key".to_string(),
                )
            })?;
            Ok(Arc::new(OpenAIEmbedder::with_config(
                key,
                &settings.model,
                settings.dimensions as usize,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_local_embedder() {
        let settings = EmbeddingSettings::default();
        let embedder = create_embedder(&settings, None).unwrap();
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_unknown_local_model_is_rejected() {
        let settings = EmbeddingSettings {
            local_model: "word2vec".to_string(),
            ..EmbeddingSettings::default()
        };
        assert!(matches!(
            create_embedder(&settings, None),
            Err(SubragError::Configuration(_))
        ));
    }

    #[test]
    fn test_openai_embedder_requires_key() {
        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::OpenAI,
            ..EmbeddingSettings::default()
        };
        assert!(matches!(
            create_embedder(&settings, None),
            Err(SubragError::EmbeddingUnavailable(_))
        ));
    }
}
