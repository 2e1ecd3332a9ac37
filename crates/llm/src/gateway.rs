//! Completion gateway.
//!
//! Binds an [`LlmClient`] to a model and exposes the two shapes the pipeline
//! needs: a blocking `complete(system, user)` and a lazy fragment stream.

use crate::client::{LlmClient, LlmRequest};
use crate::stream::TextStream;
use docqa_core::AppResult;
use futures::StreamExt;
use std::sync::Arc;

/// Sampling temperature used for grounded answers.
const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct CompletionGateway {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system_prompt: &str, user_prompt: &str) -> LlmRequest {
        let mut request = LlmRequest::new(user_prompt, &self.model).with_system(system_prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }

    /// Run a completion to the end and return its text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> AppResult<String> {
        let request = self.request(system_prompt, user_prompt);
        let response = self.client.complete(&request).await?;

        tracing::debug!(
            provider = self.client.provider_name(),
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Completion finished"
        );

        Ok(response.content)
    }

    /// Start a streaming completion.
    ///
    /// Fragments are forwarded in provider order as they arrive. Empty
    /// fragments and the end marker are dropped. Dropping the stream aborts
    /// the request.
    pub async fn complete_stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<TextStream> {
        let request = self.request(system_prompt, user_prompt).with_streaming();
        let chunks = self.client.stream(&request).await?;

        let fragments = chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) if chunk.content.is_empty() => None,
                Ok(chunk) => Some(Ok(chunk.content)),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(fragments))
    }
}
