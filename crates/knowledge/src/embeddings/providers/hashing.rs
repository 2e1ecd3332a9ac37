//! Offline embedding provider using hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use docqa_core::{AppError, AppResult};
use std::collections::{HashMap, HashSet};

/// Deterministic, content-aware embeddings with no network access.
///
/// Each non-stop-word contributes its character trigrams and the whole word
/// to hashed dimensions; the result is unit-normalized. Texts sharing words
/// land close together, which is enough for offline dry runs and tests but
/// carries no real semantics.
#[derive(Debug)]
pub struct HashingEmbeddings {
    dimensions: usize,
}

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "does",
];

impl HashingEmbeddings {
    pub const DEFAULT_DIMENSIONS: usize = 384;

    pub fn new(dimensions: usize) -> AppResult<Self> {
        if dimensions == 0 {
            return Err(AppError::Configuration(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingEmbeddings {
    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        "trigram-hash-v1"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
