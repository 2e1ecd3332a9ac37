//! Shared test doubles and end-to-end pipeline tests.


use crate::embeddings::providers::HashingEmbeddings;
use crate::embeddings::{EmbeddingGateway, EmbeddingProvider};
use crate::pipeline::Pipeline;
use docqa_core::config::ChunkingSettings;
use docqa_core::{AppError, AppResult};
use docqa_llm::{
    CompletionGateway, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
use docqa_prompt::RagTemplates;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Answers every request with a fixed text and remembers the last request.
pub(crate) struct RecordingClient {
    pub answer: String,
    pub last_request: Mutex<Option<LlmRequest>>,
}

impl RecordingClient {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> LlmRequest {
        self.last_request
            .lock()
            .unwrap()
            .clone()
            .expect("no request recorded")
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingClient {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(LlmResponse {
            content: self.answer.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        let chunks: Vec<AppResult<LlmStreamChunk>> = self
            .answer
            .split_inclusive(' ')
            .map(|word| {
                Ok(LlmStreamChunk {
                    content: word.to_string(),
                    model: request.model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Fails every call with an upstream error.
pub(crate) struct UnavailableClient;

#[async_trait::async_trait]
impl LlmClient for UnavailableClient {
    fn provider_name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::provider_status(503, "service unavailable"))
    }

    async fn stream(&self, _request: &LlmRequest) -> AppResult<LlmStream> {
        Err(AppError::provider_status(503, "service unavailable"))
    }
}

/// Hashing embeddings that start failing from the `fail_from`-th batch call
/// (zero-based), counted across the provider's lifetime.
#[derive(Debug)]
pub(crate) struct FlakyEmbeddings {
    inner: HashingEmbeddings,
    fail_from: usize,
    calls: AtomicUsize,
}

impl FlakyEmbeddings {
    pub fn failing_from(fail_from: usize) -> Self {
        Self {
            inner: HashingEmbeddings::new(384).unwrap(),
            fail_from,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyEmbeddings {
    fn provider_name(&self) -> &str {
        "flaky"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> Option<usize> {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.fail_from {
            return Err(AppError::provider_status(502, "embedding backend unavailable"));
        }
        self.inner.embed_batch(texts).await
    }
}

/// A pipeline embedding one chunk per batch through `embeddings`.
pub(crate) fn pipeline_with_embeddings(embeddings: Arc<dyn EmbeddingProvider>) -> Pipeline {
    Pipeline::new(
        EmbeddingGateway::new(embeddings, 1).unwrap(),
        CompletionGateway::new(Arc::new(RecordingClient::new("canned answer")), "gpt-4o-mini"),
        RagTemplates::builtin().unwrap(),
        ChunkingSettings::default(),
    )
    .unwrap()
}

pub(crate) fn pipeline_with(client: Arc<dyn LlmClient>, chunking: ChunkingSettings) -> Pipeline {
    Pipeline::new(
        EmbeddingGateway::new(Arc::new(HashingEmbeddings::new(384).unwrap()), 100).unwrap(),
        CompletionGateway::new(client, "gpt-4o-mini"),
        RagTemplates::builtin().unwrap(),
        chunking,
    )
    .unwrap()
}

/// A pipeline with hashing embeddings and a canned completion client.
pub(crate) fn offline_pipeline() -> Pipeline {
    pipeline_with(
        Arc::new(RecordingClient::new("canned answer")),
        ChunkingSettings::default(),
    )
}
