//! Per-session pipeline state.
//!
//! A [`Session`] holds the output of every completed stage. Slots are only
//! ever replaced wholesale, and replacing one clears every later slot, so the
//! session never mixes outputs of different runs.

use crate::chunking::Chunk;
use crate::error::{Result, SubragError};
use crate::loader::Document;
use crate::vector_store::{MemoryVectorStore, RetrievalResult, VectorStore};
use std::fmt;

/// Pipeline progress, derived from which slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Unloaded,
    Loaded,
    Chunked,
    Indexed,
    Retrieved,
    Answered,
}

impl Stage {
    /// Whether `action` may be triggered in this stage.
    pub fn allows(self, action: Action) -> bool {
        self >= action.required_stage()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Unloaded => "unloaded",
            Stage::Loaded => "loaded",
            Stage::Chunked => "chunked",
            Stage::Indexed => "indexed",
            Stage::Retrieved => "retrieved",
            Stage::Answered => "answered",
        };
        f.write_str(name)
    }
}

/// A user-triggered pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Chunk,
    BuildIndex,
    Retrieve,
    Generate,
}

impl Action {
    /// The earliest stage in which this action is enabled.
    pub fn required_stage(self) -> Stage {
        match self {
            Action::Load => Stage::Unloaded,
            Action::Chunk => Stage::Loaded,
            Action::BuildIndex => Stage::Chunked,
            Action::Retrieve => Stage::Indexed,
            Action::Generate => Stage::Retrieved,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Load => "load",
            Action::Chunk => "chunk",
            Action::BuildIndex => "build index",
            Action::Retrieve => "retrieve",
            Action::Generate => "generate answer",
        };
        f.write_str(name)
    }
}

/// State of one interactive session.
#[derive(Debug, Default)]
pub struct Session {
    documents: Option<Vec<Document>>,
    chunks: Option<Vec<Chunk>>,
    index: Option<MemoryVectorStore>,
    last_results: Option<RetrievalResult>,
    last_rag_prompt: Option<String>,
    last_answer: Option<String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        if self.last_answer.is_some() {
            Stage::Answered
        } else if self.last_rag_prompt.is_some() {
            Stage::Retrieved
        } else if self.index.is_some() {
            Stage::Indexed
        } else if self.chunks.is_some() {
            Stage::Chunked
        } else if self.documents.is_some() {
            Stage::Loaded
        } else {
            Stage::Unloaded
        }
    }

    /// Fail unless `action` is enabled in the current stage.
    pub fn guard(&self, action: Action) -> Result<()> {
        if self.stage().allows(action) {
            return Ok(());
        }
        match action {
            Action::Retrieve => Err(SubragError::IndexNotReady),
            other => Err(SubragError::StageNotReady(other)),
        }
    }

    pub fn documents(&self) -> Option<&[Document]> {
        self.documents.as_deref()
    }

    pub fn chunks(&self) -> Option<&[Chunk]> {
        self.chunks.as_deref()
    }

    pub fn index(&self) -> Option<&MemoryVectorStore> {
        self.index.as_ref()
    }

    pub fn last_results(&self) -> Option<&RetrievalResult> {
        self.last_results.as_ref()
    }

    pub fn last_rag_prompt(&self) -> Option<&str> {
        self.last_rag_prompt.as_deref()
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    /// Number of indexed entries, or zero before indexing.
    pub fn index_len(&self) -> usize {
        self.index.as_ref().map(|i| i.len()).unwrap_or(0)
    }

    /// Drop everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = Some(documents);
        self.clear_from(Stage::Chunked);
    }

    pub(crate) fn set_chunks(&mut self, chunks: Vec<Chunk>) {
        self.chunks = Some(chunks);
        self.clear_from(Stage::Indexed);
    }

    pub(crate) fn set_index(&mut self, index: MemoryVectorStore) {
        self.index = Some(index);
        self.clear_from(Stage::Retrieved);
    }

    /// Record a retrieval. `prompt` is `None` when nothing was retrieved,
    /// which disables answer generation until the next retrieval.
    pub(crate) fn set_retrieval(&mut self, results: RetrievalResult, prompt: Option<String>) {
        self.last_results = Some(results);
        self.last_rag_prompt = prompt;
        self.last_answer = None;
    }

    pub(crate) fn set_answer(&mut self, answer: String) {
        self.last_answer = Some(answer);
    }

    fn clear_from(&mut self, stage: Stage) {
        if stage <= Stage::Chunked {
            self.chunks = None;
        }
        if stage <= Stage::Indexed {
            self.index = None;
        }
        if stage <= Stage::Retrieved {
            self.last_results = None;
            self.last_rag_prompt = None;
        }
        self.last_answer = None;
    }
}
