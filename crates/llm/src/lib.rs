//! Completion gateway for docqa.
//!
//! This crate wraps the external generative model behind a small trait
//! ([`LlmClient`]) and exposes [`CompletionGateway`], which the RAG pipeline
//! uses to turn an assembled system/user prompt pair into answer text, either
//! all at once or as a stream of fragments.
//!
//! # Example
//! ```no_run
//! use docqa_core::Credential;
//! use docqa_llm::{providers::OpenAiClient, CompletionGateway};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(
//!     "https://api.openai.com/v1",
//!     &Credential::new("sk-..."),
//!     Duration::from_secs(60),
//! )?;
//! let gateway = CompletionGateway::new(Arc::new(client), "gpt-4o-mini");
//! let answer = gateway.complete("You are helpful.", "Hello!").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod gateway;
pub mod providers;
pub mod stream;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use gateway::CompletionGateway;
pub use providers::OpenAiClient;
pub use stream::{fragment_stream, split_fragments, SseDecoder, TextStream};
