//! In-memory vector index for one pipeline session.
//!
//! The index is built once per ingestion batch and never mutated afterwards;
//! re-ingestion builds a fresh index and swaps it in.

use crate::embeddings::EmbeddingGateway;
use crate::types::{Chunk, RetrievalResult, RetrievedChunk};
use docqa_core::{AppError, AppResult};

/// Chunks and their embeddings, searched by cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Embed every chunk and build an index over the results.
    ///
    /// Any embedding failure aborts the build; no partial index is returned.
    pub async fn build(chunks: Vec<Chunk>, gateway: &EmbeddingGateway) -> AppResult<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = gateway.embed_batch(&texts).await?;
        Self::from_embeddings(chunks, vectors)
    }

    /// Pair chunks with precomputed vectors.
    pub fn from_embeddings(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        if chunks.len() != vectors.len() {
            return Err(AppError::provider(format!(
                "Got {} embeddings for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let dimensions = vectors.first().map(Vec::len);
        if let Some(dims) = dimensions {
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                return Err(AppError::Configuration(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    dims,
                    bad.len()
                )));
            }
        }

        tracing::debug!(
            "Built vector index with {} entries (dimensions: {:?})",
            chunks.len(),
            dimensions
        );

        Ok(Self {
            entries: chunks.into_iter().zip(vectors).collect(),
            dimensions,
        })
    }

    /// Return up to `k` chunks ranked by descending cosine similarity.
    ///
    /// Ties keep insertion order. `k` larger than the index returns every entry.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<RetrievalResult> {
        if k == 0 {
            return Err(AppError::Configuration(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let Some(dims) = self.dimensions else {
            return Ok(RetrievalResult::default());
        };

        if query.len() != dims {
            return Err(AppError::Configuration(format!(
                "Query embedding has dimension {}, index has {}",
                query.len(),
                dims
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, vector))| (i, cosine_similarity(query, vector)))
            .collect();

        // sort_by is stable, so equal scores stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(RetrievalResult {
            chunks: scored
                .into_iter()
                .map(|(i, score)| RetrievedChunk {
                    chunk: self.entries[i].0.clone(),
                    score,
                })
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|(chunk, _)| chunk)
    }
}

/// Cosine similarity of two equal-length vectors. A zero-norm operand scores 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
