//! Document question answering over an in-memory vector index.
//!
//! Documents are split into overlapping character chunks, embedded, and held
//! in a per-session [`VectorIndex`]. Questions are embedded the same way, the
//! closest chunks become numbered context blocks, and the completion model
//! answers from that context alone.
//!
//! # Example
//! ```no_run
//! use docqa_core::AppConfig;
//! use docqa_knowledge::embeddings::{create_provider, EmbeddingConfig};
//! use docqa_knowledge::{load_documents, AnswerOptions, Pipeline};
//! use docqa_llm::OpenAiClient;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let credential = config.require_api_key()?;
//!
//! let embeddings = create_provider(&EmbeddingConfig::from_app_config(&config), Some(&credential))?;
//! let client = OpenAiClient::new(&config.provider.base_url, &credential, Duration::from_secs(60))?;
//!
//! let mut pipeline = Pipeline::from_config(&config, embeddings, Arc::new(client))?;
//! pipeline.ingest(&load_documents(&[PathBuf::from("dynamo.pdf")])).await?;
//!
//! let answer = pipeline.answer("What is DynamoDB?", &AnswerOptions::from_config(&config)).await?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embeddings;
pub mod loader;
pub mod pipeline;
pub mod retriever;
pub mod session;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{EmbeddingGateway, EmbeddingProvider};
pub use loader::{load_document, load_documents};
pub use pipeline::Pipeline;
pub use retriever::Retriever;
pub use session::{InMemorySessionStore, SessionStore, SharedPipeline};
pub use types::{
    Answer, AnswerOptions, AnswerStream, Chunk, Document, IngestStats, PipelineState,
    PipelineStats, RetrievalResult, RetrievedChunk,
};
pub use vector_index::{cosine_similarity, VectorIndex};
