//! Embedding configuration.

use docqa_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAi,
    /// Deterministic offline trigram hashing
    Hashing,
}

/// Embedding configuration for one pipeline session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,

    /// API base URL (OpenAI backend only)
    pub base_url: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Requested embedding dimensions; `None` lets the model decide
    pub dimensions: Option<usize>,

    /// Maximum number of texts per embedding request
    pub batch_size: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            batch_size: 100,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingConfig {
    /// Derive from the `provider` section of the application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            backend: EmbeddingBackend::OpenAi,
            base_url: config.provider.base_url.clone(),
            model: config.provider.embedding_model.clone(),
            dimensions: None,
            batch_size: config.provider.batch_size,
            timeout_secs: config.provider.timeout_secs,
        }
    }

    /// Offline hashing embeddings, for dry runs and tests.
    pub fn offline() -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            model: "trigram-hash-v1".to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_app_config() {
        let mut app = AppConfig::default();
        app.provider.embedding_model = "text-embedding-3-large".to_string();
        app.provider.batch_size = 16;

        let config = EmbeddingConfig::from_app_config(&app);
        assert_eq!(config.backend, EmbeddingBackend::OpenAi);
        assert_eq!(config.model, "text-embedding-3-large");
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.dimensions, None);
    }

    #[test]
    fn test_offline() {
        let config = EmbeddingConfig::offline();
        assert_eq!(config.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.batch_size, 100);
    }
}
