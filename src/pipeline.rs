//! Pipeline stages for Subrag.
//!
//! Each stage reads from and writes to a [`Session`] passed in by the caller.
//! A failing stage returns an error and leaves the session untouched.

use crate::chunking::{Chunk, TextSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, SubragError};
use crate::loader::DocumentLoader;
use crate::openai::ApiKey;
use crate::rag::{AnswerGenerator, PromptAssembler};
use crate::session::{Action, Session};
use crate::vector_store::{MemoryVectorStore, RetrievalResult, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of the load stage.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Description of the loaded source.
    pub source: String,
    /// Documents returned by the loader. Zero means nothing was stored.
    pub documents: usize,
}

/// Outcome of the chunk stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    pub chunks: usize,
    pub chunk_size: usize,
    pub overlap: usize,
    /// The first chunk, for previews.
    pub first_chunk: Option<Chunk>,
}

/// Outcome of the index stage.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub entries: usize,
    pub dimensions: usize,
}

/// Outcome of the retrieve stage.
#[derive(Debug, Clone)]
pub struct RetrievalReport {
    pub question: String,
    pub results: RetrievalResult,
    /// Assembled prompt; `None` when nothing was retrieved.
    pub prompt: Option<String>,
}

/// The retrieval pipeline: splitter, embedder and prompt assembler.
pub struct Pipeline {
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    assembler: PromptAssembler,
}

impl Pipeline {
    /// Create a pipeline from its components.
    pub fn new(splitter: TextSplitter, embedder: Arc<dyn Embedder>, assembler: PromptAssembler) -> Self {
        Self {
            splitter,
            embedder,
            assembler,
        }
    }

    /// Create a pipeline from configuration.
    pub fn from_settings(settings: &Settings, prompts: Prompts, api_key: Option<&ApiKey>) -> Result<Self> {
        let splitter = TextSplitter::new(settings.chunking.chunk_size, settings.chunking.overlap)?;
        let embedder = create_embedder(&settings.embedding, api_key)?;
        let assembler =
            PromptAssembler::new(settings.retrieval.max_context_chars).with_prompts(prompts);

        info!(
            "Pipeline ready (chunk size {}, overlap {}, embeddings: {})",
            splitter.chunk_size(),
            splitter.overlap(),
            settings.embedding.provider
        );

        Ok(Self::new(splitter, embedder, assembler))
    }

    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Load documents. An empty load is reported but not stored.
    #[instrument(skip(self, session, loader), fields(source = %loader.source()))]
    pub fn load(&self, session: &mut Session, loader: &dyn DocumentLoader) -> Result<LoadReport> {
        session.guard(Action::Load)?;

        let documents = loader.load()?;
        let report = LoadReport {
            source: loader.source(),
            documents: documents.len(),
        };

        if documents.is_empty() {
            info!("Loader returned no documents");
        } else {
            info!("Loaded {} documents", documents.len());
            session.set_documents(documents);
        }

        Ok(report)
    }

    /// Split the loaded documents into chunks.
    #[instrument(skip(self, session))]
    pub fn chunk(&self, session: &mut Session) -> Result<ChunkReport> {
        session.guard(Action::Chunk)?;
        let documents = session
            .documents()
            .ok_or(SubragError::StageNotReady(Action::Chunk))?;

        let chunks = self.splitter.split_documents(documents);
        let report = ChunkReport {
            chunks: chunks.len(),
            chunk_size: self.splitter.chunk_size(),
            overlap: self.splitter.overlap(),
            first_chunk: chunks.first().cloned(),
        };

        info!("Created {} chunks", chunks.len());
        session.set_chunks(chunks);
        Ok(report)
    }

    /// Load and chunk in one step. Chunking is skipped when nothing was loaded.
    pub fn load_and_chunk(
        &self,
        session: &mut Session,
        loader: &dyn DocumentLoader,
    ) -> Result<(LoadReport, Option<ChunkReport>)> {
        let load = self.load(session, loader)?;
        if load.documents == 0 {
            return Ok((load, None));
        }
        let chunk = self.chunk(session)?;
        Ok((load, Some(chunk)))
    }

    /// Embed every chunk and build a fresh index.
    #[instrument(skip(self, session))]
    pub async fn build_index(&self, session: &mut Session) -> Result<IndexReport> {
        session.guard(Action::BuildIndex)?;
        let chunks = session
            .chunks()
            .ok_or(SubragError::StageNotReady(Action::BuildIndex))?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(SubragError::EmbeddingUnavailable(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let entries = vectors.into_iter().zip(chunks.iter().cloned()).collect();
        let index = MemoryVectorStore::build(entries)?;
        let report = IndexReport {
            entries: index.len(),
            dimensions: index.dimensions(),
        };

        info!("Indexed {} chunks", report.entries);
        session.set_index(index);
        Ok(report)
    }

    /// Retrieve the top `k` chunks for `question` and assemble the prompt.
    #[instrument(skip(self, session))]
    pub async fn retrieve(&self, session: &mut Session, question: &str, k: usize) -> Result<RetrievalReport> {
        session.guard(Action::Retrieve)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(SubragError::InvalidInput("Please enter a question first.".to_string()));
        }
        if k == 0 {
            return Err(SubragError::InvalidInput("top-k must be at least 1".to_string()));
        }

        let index = session.index().ok_or(SubragError::IndexNotReady)?;
        let query_embedding = self.embedder.embed(question).await?;
        let results = index.query(&query_embedding, k)?;

        let prompt = if results.is_empty() {
            None
        } else {
            Some(self.assembler.assemble(question, &results))
        };

        info!("Retrieved {} results", results.len());
        session.set_retrieval(results.clone(), prompt.clone());

        Ok(RetrievalReport {
            question: question.to_string(),
            results,
            prompt,
        })
    }

    /// Send the last assembled prompt to the generator.
    #[instrument(skip(self, session, generator))]
    pub async fn generate(&self, session: &mut Session, generator: &dyn AnswerGenerator) -> Result<String> {
        session.guard(Action::Generate)?;
        let prompt = session
            .last_rag_prompt()
            .ok_or(SubragError::StageNotReady(Action::Generate))?;

        let answer = generator.generate(prompt).await?;
        session.set_answer(answer.clone());
        Ok(answer)
    }
}
