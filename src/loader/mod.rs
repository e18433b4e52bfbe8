//! Document loading for the retrieval pipeline.
//!
//! A loader turns a source (currently a SubRip subtitle file) into text
//! documents with metadata. Loaders never see chunking or embedding.

mod srt;

pub use srt::{parse_srt, SrtLoader, SubtitleCue};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A metadata value attached to a document or chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{}", s),
            MetadataValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Ordered metadata map.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A loaded text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document text.
    pub text: String,
    /// Source metadata (path, cue timing, ...).
    pub metadata: Metadata,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Trait for document loaders.
///
/// An unreadable source is an error; a readable source with no usable
/// content yields an empty vector.
pub trait DocumentLoader: Send + Sync {
    /// Load every document from the source.
    fn load(&self) -> Result<Vec<Document>>;

    /// Human-readable description of the source, for messages.
    fn source(&self) -> String;
}
