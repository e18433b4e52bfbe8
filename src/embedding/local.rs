//! Local sentence embeddings via fastembed (ONNX Runtime).
//!
//! The model is downloaded and loaded on first use, then kept for the life of
//! the embedder. Inference is CPU-bound and runs on the blocking pool.

use super::Embedder;
use crate::error::{Result, SubragError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Default local model, the 384-dimension MiniLM sentence transformer.
pub const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";

/// Texts per inference batch.
const BATCH_SIZE: usize = 64;

/// Map a configured model name to the fastembed model and its dimensions.
fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    match name {
        "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        "multilingual-e5-small" => Ok((EmbeddingModel::MultilingualE5Small, 384)),
        other => Err(SubragError::Configuration(format!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, multilingual-e5-small",
            other
        ))),
    }
}

/// Embedder running a sentence-transformer model in-process.
#[derive(Clone)]
pub struct FastEmbedder {
    model_name: String,
    model: EmbeddingModel,
    dimensions: usize,
    cache_dir: PathBuf,
    loaded: Arc<Mutex<Option<TextEmbedding>>>,
}

impl FastEmbedder {
    /// Create an embedder for the default model.
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_LOCAL_MODEL)
    }

    /// Create an embedder for a named model. Nothing is downloaded yet.
    pub fn with_model(name: &str) -> Result<Self> {
        let (model, dimensions) = resolve_model(name)?;
        Ok(Self {
            model_name: name.to_string(),
            model,
            dimensions,
            cache_dir: default_cache_dir(),
            loaded: Arc::new(Mutex::new(None)),
        })
    }

    /// Store downloaded model files under `dir`.
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// `<cache dir>/subrag/models`.
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subrag")
        .join("models")
}

/// Load the model if needed and embed `texts`. Runs on a blocking thread.
fn embed_blocking(
    loaded: &Mutex<Option<TextEmbedding>>,
    model: EmbeddingModel,
    cache_dir: PathBuf,
    texts: Vec<String>,
) -> Result<Vec<Vec<f32>>> {
    let mut guard = loaded
        .lock()
        .map_err(|_| SubragError::EmbeddingUnavailable("embedding model lock poisoned".to_string()))?;

    if guard.is_none() {
        info!("Loading local embedding model {:?}", model);
        let options = InitOptions::new(model)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(true);
        let instance = TextEmbedding::try_new(options).map_err(|e| {
            SubragError::EmbeddingUnavailable(format!("Failed to initialize local embedding model: {}", e))
        })?;
        *guard = Some(instance);
    }

    let instance = guard
        .as_mut()
        .ok_or_else(|| SubragError::EmbeddingUnavailable("embedding model not loaded".to_string()))?;

    instance
        .embed(texts, Some(BATCH_SIZE))
        .map_err(|e| SubragError::EmbeddingUnavailable(format!("Local embedding failed: {}", e)))
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| SubragError::EmbeddingUnavailable("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts locally with {}", texts.len(), self.model_name);

        let loaded = self.loaded.clone();
        let model = self.model.clone();
        let cache_dir = self.cache_dir.clone();
        let expected = texts.len();
        let texts = texts.to_vec();

        let vectors = tokio::task::spawn_blocking(move || embed_blocking(&loaded, model, cache_dir, texts))
            .await
            .map_err(|e| SubragError::EmbeddingUnavailable(format!("Embedding task failed: {}", e)))??;

        check_output(&vectors, expected, self.dimensions)?;
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// One vector per input, each of the model's width.
fn check_output(vectors: &[Vec<f32>], expected: usize, dimensions: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(SubragError::EmbeddingUnavailable(format!(
            "expected {} embeddings, got {}",
            expected,
            vectors.len()
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(SubragError::EmbeddingUnavailable(format!(
            "expected {}-dimension embeddings, got {}",
            dimensions,
            bad.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_minilm() {
        let embedder = FastEmbedder::new().unwrap();
        assert_eq!(embedder.model_name(), "all-minilm-l6-v2");
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_known_models_have_dimensions() {
        assert_eq!(FastEmbedder::with_model("bge-base-en-v1.5").unwrap().dimensions(), 768);
        assert_eq!(FastEmbedder::with_model("bge-small-en-v1.5").unwrap().dimensions(), 384);
    }

    #[test]
    fn test_unknown_model_is_configuration_error() {
        assert!(matches!(
            FastEmbedder::with_model("word2vec"),
            Err(SubragError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_load_model() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = FastEmbedder::new().unwrap().with_cache_dir(dir.path().to_path_buf());

        let vectors = embedder.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
        assert!(embedder.loaded.lock().unwrap().is_none());
    }

    #[test]
    fn test_output_shape_is_checked() {
        assert!(check_output(&[vec![0.0; 4], vec![0.0; 4]], 2, 4).is_ok());
        assert!(matches!(
            check_output(&[vec![0.0; 4]], 2, 4),
            Err(SubragError::EmbeddingUnavailable(_))
        ));
        assert!(matches!(
            check_output(&[vec![0.0; 3]], 1, 4),
            Err(SubragError::EmbeddingUnavailable(_))
        ));
    }
}
