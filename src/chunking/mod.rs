//! Splitting loaded documents into overlapping, bounded-length chunks.
//!
//! Chunks are the unit of retrieval: each one is embedded and indexed on its own.

mod window;

pub use window::TextSplitter;

use crate::error::Result;
use crate::loader::{Document, Metadata};
use serde::{Deserialize, Serialize};

/// A bounded-length slice of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, at most `chunk_size` characters.
    pub text: String,
    /// Source document metadata plus `chunk_index` and `start_offset`.
    pub metadata: Metadata,
    /// Position of the source document in the loaded sequence.
    pub source_index: usize,
}

impl Chunk {
    /// Number of characters in this chunk.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters of the text.
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.text, max_chars)
    }
}

/// Split documents with a sliding window of `chunk_size` characters that
/// advances by `chunk_size - overlap`.
///
/// Fails with a configuration error unless `0 <= overlap < chunk_size`.
pub fn split(documents: &[Document], chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(TextSplitter::new(chunk_size, overlap)?.split_documents(documents))
}

/// Take at most `max_chars` characters from the start of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
