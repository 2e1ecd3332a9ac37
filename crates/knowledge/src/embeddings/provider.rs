//! Embedding provider trait and factory.

use crate::embeddings::config::{EmbeddingBackend, EmbeddingConfig};
use crate::embeddings::providers::{HashingEmbeddings, OpenAiEmbeddings};
use docqa_core::{AppError, AppResult, Credential};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "openai", "hashing")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Embedding dimensions, when known before the first call.
    fn dimensions(&self) -> Option<usize>;

    /// Generate embeddings for multiple texts, one vector per input, in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::provider("No embedding returned"))
    }
}

/// Create an embedding provider based on configuration.
///
/// The OpenAI backend needs a credential; the hashing backend ignores it.
pub fn create_provider(
    config: &EmbeddingConfig,
    credential: Option<&Credential>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbeddings::new(
            config.dimensions.unwrap_or(HashingEmbeddings::DEFAULT_DIMENSIONS),
        )?)),

        EmbeddingBackend::OpenAi => {
            let credential = credential.ok_or_else(|| {
                AppError::Configuration(
                    "No API key configured. Set DOCQA_API_KEY or OPENAI_API_KEY.".to_string(),
                )
            })?;
            Ok(Arc::new(OpenAiEmbeddings::new(config, credential)?))
        }
    }
}
