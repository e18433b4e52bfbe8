//! In-memory vector store implementation.

use super::{cosine_similarity, RetrievalResult, SearchResult, VectorStore};
use crate::chunking::Chunk;
use crate::error::{Result, SubragError};
use tracing::debug;

/// In-memory, append-once vector store.
///
/// Entries keep insertion order, so equal scores come back in the order the
/// chunks were indexed.
#[derive(Debug, Clone)]
pub struct MemoryVectorStore {
    entries: Vec<(Vec<f32>, Chunk)>,
    dimensions: usize,
}

impl MemoryVectorStore {
    /// Build a store from `(embedding, chunk)` pairs.
    ///
    /// Fails on empty input or when vectors disagree in length.
    pub fn build(entries: Vec<(Vec<f32>, Chunk)>) -> Result<Self> {
        let dimensions = match entries.first() {
            Some((vector, _)) => vector.len(),
            None => return Err(SubragError::EmptyIndex),
        };

        if let Some((vector, _)) = entries.iter().find(|(v, _)| v.len() != dimensions) {
            return Err(SubragError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
            });
        }

        debug!("Built index with {} entries of dimension {}", entries.len(), dimensions);

        Ok(Self {
            entries,
            dimensions,
        })
    }
}

impl VectorStore for MemoryVectorStore {
    fn query(&self, query_embedding: &[f32], k: usize) -> Result<RetrievalResult> {
        if query_embedding.len() != self.dimensions {
            return Err(SubragError::DimensionMismatch {
                expected: self.dimensions,
                actual: query_embedding.len(),
            });
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(vector, chunk)| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, vector),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k.min(self.entries.len()));

        Ok(results)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
