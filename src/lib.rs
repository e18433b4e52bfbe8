//! Subrag - question answering over subtitle files
//!
//! Loads a SubRip (`.srt`) subtitle file, splits its text into overlapping
//! chunks, indexes them in memory and answers questions with an LLM using only
//! the retrieved chunks as context. A small banking chat assistant ("Eva")
//! ships alongside.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `loader` - SubRip parsing and document loading
//! - `chunking` - Sliding-window text splitting
//! - `embedding` - Embedding providers (local fastembed model, OpenAI)
//! - `vector_store` - In-memory similarity index
//! - `rag` - Prompt assembly and answer generation
//! - `session` - Stage tracking for one question-answering session
//! - `pipeline` - The load, chunk, index, retrieve and generate steps
//! - `assistant` - The Eva banking chat assistant
//! - `cli` - Command-line front-end
//!
//! # Example
//!
//! ```rust,no_run
//! use subrag::config::{Prompts, Settings};
//! use subrag::loader::SrtLoader;
//! use subrag::pipeline::Pipeline;
//! use subrag::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::from_settings(&settings, Prompts::default(), None)?;
//!     let loader = SrtLoader::new("talk.srt", settings.loader.granularity);
//!
//!     let mut session = Session::new();
//!     pipeline.load_and_chunk(&mut session, &loader)?;
//!     pipeline.build_index(&mut session).await?;
//!
//!     let retrieval = pipeline.retrieve(&mut session, "What is the talk about?", 3).await?;
//!     if let Some(prompt) = retrieval.prompt {
//!         println!("{}", prompt);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod loader;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod session;
pub mod vector_store;

pub use error::{Result, SubragError};
