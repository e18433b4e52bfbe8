//! Configuration settings for Subrag.

use crate::error::{Result, SubragError};
use crate::openai::ApiKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub loader: LoaderSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// How a subtitle file is turned into documents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadGranularity {
    /// One document holding every cue's text.
    #[default]
    File,
    /// One document per subtitle cue.
    Cue,
}

impl std::str::FromStr for LoadGranularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(LoadGranularity::File),
            "cue" | "entry" => Ok(LoadGranularity::Cue),
            _ => Err(format!("Unknown load granularity: {}", s)),
        }
    }
}

impl std::fmt::Display for LoadGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadGranularity::File => write!(f, "file"),
            LoadGranularity::Cue => write!(f, "cue"),
        }
    }
}

/// Subtitle loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Path of the subtitle file to load.
    pub path: String,
    /// Document granularity (file, cue).
    pub granularity: LoadGranularity,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            path: "chatbots/sample.srt".to_string(),
            granularity: LoadGranularity::File,
        }
    }
}

/// Text splitting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-transformer model run in-process.
    #[default]
    Local,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "fastembed" => Ok(EmbeddingProvider::Local),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Local => write!(f, "local"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (local, openai).
    pub provider: EmbeddingProvider,
    /// Model for the local provider; its width is fixed by the model.
    pub local_model: String,
    /// Model for the openai provider.
    pub model: String,
    /// Embedding dimensions requested from the openai provider.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            local_model: crate::embedding::DEFAULT_LOCAL_MODEL.to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
        }
    }
}

/// Retrieval and prompt assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks to retrieve per question.
    pub top_k: usize,
    /// Characters of each chunk placed into the prompt context.
    pub max_context_chars: usize,
    /// Characters of each chunk shown in previews.
    pub preview_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_context_chars: 1000,
            preview_chars: 1000,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional API key. `OPENAI_API_KEY` or `--api-key` take precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            api_key: None,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = Self::read_from(&config_path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings without validating them, falling back to defaults when
    /// the file does not exist. Used where a broken file must still be reachable.
    pub fn read_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str::<Settings>(&content)?)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(SubragError::Configuration(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(SubragError::Configuration(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(SubragError::Configuration(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(SubragError::Configuration(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubragError::Configuration(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subrag")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded subtitle path.
    pub fn subtitle_path(&self) -> PathBuf {
        Self::expand_path(&self.loader.path)
    }

    /// Resolve the API key: explicit value first, then the environment, then the config file.
    pub fn resolve_api_key(&self, explicit: Option<ApiKey>) -> Option<ApiKey> {
        explicit
            .or_else(ApiKey::from_env)
            .or_else(|| self.llm.api_key.as_deref().and_then(ApiKey::new))
    }
}
