//! Configuration module for Subrag.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, LlmSettings,
    LoadGranularity, LoaderSettings, PromptSettings, RetrievalSettings, Settings,
};
