//! Feature-hashing embedder used as an offline stand-in in tests.
//!
//! Each lowercase alphanumeric token is hashed into one of `dimensions`
//! buckets with a hash-derived sign, weighted by `1 + ln(tf)`, and the vector
//! is L2-normalised. Texts sharing words therefore have positive cosine
//! similarity, with no model download or network access. Tokens are summed in
//! sorted order so colliding buckets add up identically on every call.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimensions` entries (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Embed synchronously. Empty or token-free text maps to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (token, count) in counts {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * (1.0 + (count as f32).ln());
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |hash, b| (hash ^ *b as u64).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::cosine_similarity;

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("Marcus said hello").await.unwrap();
        let b = embedder.embed("Marcus said hello").await.unwrap();
        assert_eq!(a, b);

        let batch = embedder
            .embed_batch(&["Marcus said hello".to_string()])
            .await
            .unwrap();
        assert_eq!(batch[0], a);
    }

    #[test]
    fn test_colliding_tokens_are_bit_identical() {
        let embedder = HashingEmbedder::new(2);
        let text: String = (0..60).map(|i| format!("token{} ", i)).collect();

        let first = embedder.embed_text(&text);
        for _ in 0..200 {
            assert_eq!(HashingEmbedder::new(2).embed_text(&text), first);
            assert_eq!(embedder.embed_text(&text), first);
        }
    }

    #[test]
    fn test_vectors_are_normalised() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed_text("the quick brown fox");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_eq!(v.len(), 384);
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("  ... ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_shared_words_are_more_similar() {
        let embedder = HashingEmbedder::new(4096);
        let query = embedder.embed_text("What did Marcus say about the budget?");
        let related = embedder.embed_text("Marcus talked about the budget");
        let unrelated = embedder.embed_text("Revenue grew by twelve percent");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_tokenize_is_case_insensitive() {
        let tokens: Vec<String> = tokenize("Hello, HELLO world!").collect();
        assert_eq!(tokens, vec!["hello", "hello", "world"]);
    }
}
