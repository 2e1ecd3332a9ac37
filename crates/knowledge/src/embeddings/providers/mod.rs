//! Embedding provider implementations.

pub mod hashing;
pub mod openai;

pub use hashing::HashingEmbeddings;
pub use openai::OpenAiEmbeddings;
