//! Error types for Subrag.

use crate::session::Action;
use thiserror::Error;

/// Library-level error type for Subrag operations.
#[derive(Error, Debug)]
pub enum SubragError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load file: {0}")]
    LoadFailure(String),

    #[error("Embedding model unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Cannot build an index from zero entries")]
    EmptyIndex,

    #[error("Index has not been built yet")]
    IndexNotReady,

    #[error("Cannot run '{0}' before the previous stage has completed")]
    StageNotReady(Action),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("No OpenAI API key configured")]
    MissingApiKey,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Subrag operations.
pub type Result<T> = std::result::Result<T, SubragError>;
