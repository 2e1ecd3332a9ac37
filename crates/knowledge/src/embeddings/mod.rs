//! Embedding gateway for the RAG pipeline.
//!
//! Wraps one [`EmbeddingProvider`] with batching and dimension checks.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::{EmbeddingBackend, EmbeddingConfig};
pub use provider::{create_provider, EmbeddingProvider};

use docqa_core::{AppError, AppResult};
use std::sync::{Arc, OnceLock};

/// Batching, order-preserving front for an embedding provider.
///
/// The gateway pins the embedding dimension: either the provider's declared
/// dimension or the length of the first vector it sees. Any later vector of a
/// different length is rejected, so one session never mixes dimensions.
#[derive(Debug, Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    dimensions: Arc<OnceLock<usize>>,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> AppResult<Self> {
        if batch_size == 0 {
            return Err(AppError::Configuration(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        let dimensions = OnceLock::new();
        if let Some(dims) = provider.dimensions() {
            let _ = dimensions.set(dims);
        }

        Ok(Self {
            provider,
            batch_size,
            dimensions: Arc::new(dimensions),
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// The pinned dimension, once known.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions.get().copied()
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::provider("No embedding returned"))
    }

    /// Embed `texts`, one vector per input in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embeddings = self.provider.embed_batch(batch).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::provider(format!(
                    "Provider '{}' returned {} embeddings for {} inputs",
                    self.provider.provider_name(),
                    embeddings.len(),
                    batch.len()
                )));
            }

            for embedding in &embeddings {
                self.check_dimensions(embedding.len())?;
            }

            vectors.extend(embeddings);
        }

        tracing::debug!(
            "Generated {} embeddings of dimension {:?}",
            vectors.len(),
            self.dimensions()
        );

        Ok(vectors)
    }

    fn check_dimensions(&self, len: usize) -> AppResult<()> {
        let pinned = *self.dimensions.get_or_init(|| len);
        if pinned != len {
            return Err(AppError::Configuration(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                pinned, len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::HashingEmbeddings;
    use std::sync::Mutex;

    /// Returns vectors whose length follows a script, one entry per call.
    #[derive(Debug)]
    struct ScriptedProvider {
        dims_per_call: Mutex<Vec<usize>>,
        drop_one: bool,
        batches: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn new(dims_per_call: Vec<usize>) -> Self {
            Self {
                dims_per_call: Mutex::new(dims_per_call),
                drop_one: false,
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted-v1"
        }

        fn dimensions(&self) -> Option<usize> {
            None
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.batches.lock().unwrap().push(texts.len());
            let dims = self.dims_per_call.lock().unwrap().remove(0);
            let count = if self.drop_one { texts.len() - 1 } else { texts.len() };
            Ok((0..count).map(|i| vec![i as f32; dims]).collect())
        }
    }

    #[tokio::test]
    async fn test_gateway_splits_batches_and_preserves_order() {
        let provider = Arc::new(ScriptedProvider::new(vec![4, 4, 4]));
        let gateway = EmbeddingGateway::new(provider.clone(), 2).unwrap();

        let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();
        let vectors = gateway.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 5);
        assert_eq!(*provider.batches.lock().unwrap(), vec![2, 2, 1]);
        // first vector of each batch is index 0 within that batch
        assert_eq!(vectors[2][0], 0.0);
        assert_eq!(vectors[3][0], 1.0);
        assert_eq!(gateway.dimensions(), Some(4));
    }

    #[tokio::test]
    async fn test_gateway_rejects_dimension_change() {
        let provider = Arc::new(ScriptedProvider::new(vec![4, 8]));
        let gateway = EmbeddingGateway::new(provider, 10).unwrap();

        gateway.embed("first").await.unwrap();
        let err = gateway.embed("second").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_gateway_rejects_count_mismatch() {
        let provider = Arc::new(ScriptedProvider {
            drop_one: true,
            ..ScriptedProvider::new(vec![4])
        });
        let gateway = EmbeddingGateway::new(provider, 10).unwrap();

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = gateway.embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_gateway_pins_declared_dimensions() {
        let gateway =
            EmbeddingGateway::new(Arc::new(HashingEmbeddings::new(64).unwrap()), 100).unwrap();
        assert_eq!(gateway.dimensions(), Some(64));
        assert_eq!(gateway.embed("hello").await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_gateway_empty_input_skips_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let gateway = EmbeddingGateway::new(provider.clone(), 10).unwrap();

        assert!(gateway.embed_batch(&[]).await.unwrap().is_empty());
        assert!(provider.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let provider = Arc::new(HashingEmbeddings::new(8).unwrap());
        assert!(matches!(
            EmbeddingGateway::new(provider, 0),
            Err(AppError::Configuration(_))
        ));
    }
}
