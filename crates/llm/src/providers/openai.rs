//! OpenAI chat completions provider.
//!
//! Works against any OpenAI-compatible `/chat/completions` endpoint.
//! Streaming uses server-sent events terminated by `data: [DONE]`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::stream::SseDecoder;
use docqa_core::{AppError, AppResult, Credential};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl From<ChatUsage> for LlmUsage {
    fn from(usage: ChatUsage) -> Self {
        LlmUsage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

/// OpenAI chat client.
///
/// The credential is fixed at construction and baked into the default
/// headers; there is no way to swap it afterwards.
pub struct OpenAiClient {
    endpoint: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Build a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, credential: &Credential, timeout: Duration) -> AppResult<Self> {
        if credential.is_empty() {
            return Err(AppError::Configuration(
                "OpenAI client requires a non-empty API key".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(auth_headers(credential)?)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client,
        })
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest, stream: bool) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::provider_status(
                status.as_u16(),
                format!("OpenAI chat completions failed: {}", error_text),
            ));
        }

        Ok(response)
    }
}

/// Build the Authorization/Content-Type headers shared by OpenAI clients.
pub fn auth_headers(credential: &Credential) -> AppResult<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| AppError::Configuration("API key contains invalid characters".to_string()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Map a reqwest transport error into a provider error.
pub fn transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::provider(format!("Request timed out: {}", err))
    } else {
        AppError::Provider {
            status: err.status().map(|s| s.as_u16()),
            message: format!("Request failed: {}", err),
        }
    }
}

/// Decode one SSE `data:` payload into a stream chunk.
///
/// Returns `None` for payloads that carry nothing (role-only deltas).
fn decode_event(payload: &str, fallback_model: &str) -> Option<AppResult<LlmStreamChunk>> {
    if payload.trim() == "[DONE]" {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            model: fallback_model.to_string(),
            done: true,
            usage: None,
        }));
    }

    let chunk: ChatStreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(AppError::provider(format!(
                "Failed to parse stream chunk: {}",
                e
            ))))
        }
    };

    let usage = chunk.usage.map(LlmUsage::from);
    let choice = chunk.choices.into_iter().next();
    let finished = choice
        .as_ref()
        .map(|c| c.finish_reason.is_some())
        .unwrap_or(false);
    let content = choice.and_then(|c| c.delta.content).unwrap_or_default();

    if content.is_empty() && usage.is_none() && !finished {
        return None;
    }

    Some(Ok(LlmStreamChunk {
        content,
        model: if chunk.model.is_empty() {
            fallback_model.to_string()
        } else {
            chunk.model
        },
        done: false,
        usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        info!("Sending completion request");

        let body = self.to_chat_request(request, false);
        let response = self.send(&body).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(chars = content.len(), "Received completion");

        Ok(LlmResponse {
            content,
            model: parsed.model,
            usage: parsed.usage.map(LlmUsage::from).unwrap_or_default(),
        })
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        info!("Starting streaming request");

        let body = self.to_chat_request(request, true);
        let response = self.send(&body).await?;

        let model = request.model.clone();
        let body = Box::pin(response.bytes_stream());

        // The response body is owned by the stream; dropping the stream
        // closes the connection. At end of body the decoder is flushed so a
        // final event without a trailing newline is still delivered.
        let stream = futures::stream::unfold(
            Some((body, SseDecoder::new())),
            move |state| {
                let model = model.clone();
                async move {
                    let (mut body, mut decoder) = state?;
                    match body.next().await {
                        Some(Ok(bytes)) => {
                            let events: Vec<_> = decoder
                                .push(&bytes)
                                .iter()
                                .filter_map(|payload| decode_event(payload, &model))
                                .collect();
                            Some((events, Some((body, decoder))))
                        }
                        Some(Err(e)) => Some((vec![Err(transport_error(e))], None)),
                        None => {
                            let events: Vec<_> = decoder
                                .finish()
                                .and_then(|payload| decode_event(&payload, &model))
                                .into_iter()
                                .collect();
                            Some((events, None))
                        }
                    }
                }
            },
        )
        .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }
}
