//! Query-time retrieval: embed the query, then search the index.

use crate::embeddings::EmbeddingGateway;
use crate::types::RetrievalResult;
use crate::vector_index::VectorIndex;
use docqa_core::{AppError, AppResult};

pub struct Retriever<'a> {
    gateway: &'a EmbeddingGateway,
    index: Option<&'a VectorIndex>,
}

impl<'a> Retriever<'a> {
    /// `index` is `None` until the session has ingested something.
    pub fn new(gateway: &'a EmbeddingGateway, index: Option<&'a VectorIndex>) -> Self {
        Self { gateway, index }
    }

    /// Retrieve the `k` chunks most similar to `query`.
    pub async fn retrieve(&self, query: &str, k: usize) -> AppResult<RetrievalResult> {
        if k == 0 {
            return Err(AppError::Configuration(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let index = self.index.ok_or_else(|| {
            AppError::NotReady("No documents have been ingested yet".to_string())
        })?;

        let query_embedding = self.gateway.embed(query).await?;
        let result = index.search(&query_embedding, k)?;

        tracing::info!(
            "Retrieved {} chunks (max score: {:.3})",
            result.len(),
            result.max_score().unwrap_or(0.0)
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::HashingEmbeddings;
    use crate::types::Chunk;
    use std::sync::Arc;

    fn gateway() -> EmbeddingGateway {
        EmbeddingGateway::new(Arc::new(HashingEmbeddings::new(256).unwrap()), 100).unwrap()
    }

    fn chunk(text: &str, position: u32) -> Chunk {
        Chunk {
            source: "notes.txt".to_string(),
            position,
            offset: 0,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_retrieve_before_index_is_not_ready() {
        let gateway = gateway();
        let err = Retriever::new(&gateway, None)
            .retrieve("anything", 3)
            .await
            .unwrap_err();
        assert!(err.is_not_ready());
    }

    #[tokio::test]
    async fn test_retrieve_zero_k_is_configuration_error() {
        let gateway = gateway();
        let index = VectorIndex::default();
        let err = Retriever::new(&gateway, Some(&index))
            .retrieve("anything", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_retrieve_ranks_matching_chunk_first() {
        let gateway = gateway();
        let index = VectorIndex::build(
            vec![
                chunk("Gossip protocols spread membership changes.", 0),
                chunk("Sloppy quorums keep writes available.", 1),
                chunk("Vector clocks track object versions.", 2),
            ],
            &gateway,
        )
        .await
        .unwrap();

        let result = Retriever::new(&gateway, Some(&index))
            .retrieve("How do vector clocks work?", 2)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.chunks[0].chunk.position, 2);
    }
}
