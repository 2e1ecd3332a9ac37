//! OpenAI embeddings provider.
//!
//! Talks to any OpenAI-compatible `/embeddings` endpoint. One call embeds one
//! batch; splitting large inputs into batches is the gateway's job.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::provider::EmbeddingProvider;
use docqa_core::{AppError, AppResult, Credential};
use docqa_llm::providers::openai::{auth_headers, transport_error};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embeddings client. The credential is fixed at construction.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
}

impl std::fmt::Debug for OpenAiEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig, credential: &Credential) -> AppResult<Self> {
        if credential.is_empty() {
            return Err(AppError::Configuration(
                "OpenAI embeddings require a non-empty API key".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(AppError::Configuration(
                "Missing embedding model name".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(auth_headers(credential)?)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }
}

/// Order response entries by `index` and check there is exactly one per
/// input, indexed `0..expected`.
fn into_vectors(mut response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
    response.data.sort_by_key(|entry| entry.index);

    if response.data.len() != expected {
        return Err(AppError::provider(format!(
            "OpenAI returned {} embeddings for {} inputs",
            response.data.len(),
            expected
        )));
    }

    if let Some((position, entry)) = response
        .data
        .iter()
        .enumerate()
        .find(|(position, entry)| entry.index != *position)
    {
        return Err(AppError::provider(format!(
            "OpenAI returned embedding index {} at position {}",
            entry.index, position
        )));
    }

    Ok(response
        .data
        .into_iter()
        .map(|entry| entry.embedding)
        .collect())
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::provider_status(
                status.as_u16(),
                format!("OpenAI embeddings request failed: {}", body),
            ));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::provider(format!("Failed to parse OpenAI embedding response: {}", e))
        })?;

        let vectors = into_vectors(parsed, texts.len())?;
        debug!("Received {} embeddings", vectors.len());
        Ok(vectors)
    }
}
