//! Fixed-size sliding-window splitter.

use super::Chunk;
use crate::error::{Result, SubragError};
use crate::loader::Document;
use tracing::debug;

/// Character-based sliding-window splitter.
///
/// Lengths are counted in `char`s so multi-byte text never splits inside a
/// code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. Requires `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SubragError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(SubragError::Configuration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split every document, preserving document order then position order.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .enumerate()
            .flat_map(|(source_index, doc)| self.split_document(source_index, doc))
            .collect();

        debug!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            documents.len(),
            chunks.len(),
            self.chunk_size,
            self.overlap
        );
        chunks
    }

    /// Split one document. Empty text yields no chunks.
    pub fn split_document(&self, source_index: usize, document: &Document) -> Vec<Chunk> {
        self.windows(&document.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (start, text))| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), chunk_index.into());
                metadata.insert("start_offset".to_string(), start.into());
                Chunk {
                    text,
                    metadata,
                    source_index,
                }
            })
            .collect()
    }

    /// Window `text` into `(start_char_offset, slice)` pairs.
    fn windows(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            windows.push((start, chars[start..end].iter().collect()));
            if end == chars.len() {
                break;
            }
            start += step;
        }

        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MetadataValue;
    use proptest::prelude::*;

    /// Rebuild a document's text by dropping the overlap prefix of every chunk after the first.
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut text = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                text.push_str(&chunk.text);
            } else {
                text.extend(chunk.text.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn test_window_positions() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let chunks = splitter.split_documents(&[Document::new("abcdefghij")]);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "defg", "ghij"]);
        assert_eq!(chunks[1].metadata["start_offset"], MetadataValue::Number(3.0));
        assert_eq!(chunks[2].metadata["chunk_index"], MetadataValue::Number(2.0));
    }

    #[test]
    fn test_final_chunk_may_be_short() {
        let splitter = TextSplitter::new(4, 0).unwrap();
        let chunks = splitter.split_documents(&[Document::new("abcdefghij")]);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        assert!(splitter.split_documents(&[Document::new("")]).is_empty());
    }

    #[test]
    fn test_metadata_and_source_index_inherited() {
        let splitter = TextSplitter::new(500, 50).unwrap();
        let docs = vec![
            Document::new("first").with_metadata("source", "a.srt"),
            Document::new("second").with_metadata("source", "b.srt"),
        ];
        let chunks = splitter.split_documents(&docs);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].source_index, 1);
        assert_eq!(chunks[1].metadata["source"], MetadataValue::Text("b.srt".to_string()));
    }

    #[test]
    fn test_multibyte_text() {
        let splitter = TextSplitter::new(3, 1).unwrap();
        let chunks = splitter.split_documents(&[Document::new("añoñé")]);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["año", "oñé"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_are_bounded_and_reconstruct(
            text in "\\PC{0,400}",
            chunk_size in 1usize..64,
            overlap_seed in 0usize..64,
        ) {
            let overlap = overlap_seed % chunk_size;
            let splitter = TextSplitter::new(chunk_size, overlap).unwrap();
            let chunks = splitter.split_documents(&[Document::new(text.clone())]);

            for chunk in &chunks {
                prop_assert!(chunk.char_len() <= chunk_size);
            }
            prop_assert_eq!(reconstruct(&chunks, overlap), text);
        }

        #[test]
        fn prop_adding_a_document_keeps_existing_chunks(
            texts in proptest::collection::vec("[a-z ]{0,120}", 1..5),
            extra in "[a-z ]{0,120}",
        ) {
            let splitter = TextSplitter::new(32, 8).unwrap();
            let docs: Vec<Document> = texts.iter().map(|t| Document::new(t.clone())).collect();
            let before = splitter.split_documents(&docs);

            let mut more = docs.clone();
            more.push(Document::new(extra));
            let after = splitter.split_documents(&more);

            prop_assert!(after.len() >= before.len());
            prop_assert_eq!(&after[..before.len()], &before[..]);
        }
    }
}
