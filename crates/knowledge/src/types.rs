//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use docqa_core::AppConfig;
use docqa_llm::TextStream;
use docqa_prompt::{ContextBlock, StyleOptions};
use serde::{Deserialize, Serialize};

/// Raw extracted text of one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier, usually the file name
    pub source: String,

    /// Extracted text
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A positional slice of a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier
    pub source: String,

    /// Position within source
    pub position: u32,

    /// Character offset of the first character within the source text
    pub offset: usize,

    /// Text content
    pub text: String,
}

/// A chunk paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Chunks ranked by descending similarity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.chunks.iter().map(|c| c.score).collect()
    }

    pub fn max_score(&self) -> Option<f32> {
        self.chunks.first().map(|c| c.score)
    }

    /// Borrow the chunks as prompt context blocks, in rank order.
    pub fn context_blocks(&self) -> Vec<ContextBlock<'_>> {
        self.chunks
            .iter()
            .map(|c| ContextBlock {
                text: &c.chunk.text,
                score: c.score,
            })
            .collect()
    }
}

/// Per-query answer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOptions {
    /// Number of chunks to retrieve
    pub top_k: usize,

    pub style: StyleOptions,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            style: StyleOptions {
                response_style: "detailed".to_string(),
                response_length: "comprehensive".to_string(),
                include_scores: true,
            },
        }
    }
}

impl AnswerOptions {
    /// Options seeded from the `retrieval` and `answer` config sections.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            style: StyleOptions {
                response_style: config.answer.response_style.clone(),
                response_length: config.answer.response_length.clone(),
                include_scores: config.answer.include_scores,
            },
        }
    }
}

/// A grounded answer and everything used to produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Natural language answer from the completion model
    pub answer: String,

    pub retrieval: RetrievalResult,

    #[serde(rename = "contextCount")]
    pub context_count: usize,

    /// `"Source i: 0.123"` labels; present only when scores were requested
    #[serde(rename = "similarityScores", skip_serializing_if = "Option::is_none")]
    pub similarity_scores: Option<Vec<String>>,

    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,

    #[serde(rename = "userPrompt")]
    pub user_prompt: String,
}

/// Retrieval metadata plus the live completion stream.
pub struct AnswerStream {
    pub retrieval: RetrievalResult,
    pub context_count: usize,
    pub similarity_scores: Option<Vec<String>>,

    /// Answer fragments in provider order. Dropping it aborts the request.
    pub fragments: TextStream,
}

impl std::fmt::Debug for AnswerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerStream")
            .field("retrieval", &self.retrieval)
            .field("context_count", &self.context_count)
            .field("similarity_scores", &self.similarity_scores)
            .finish_non_exhaustive()
    }
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Documents that contributed at least one chunk
    pub documents_count: usize,

    /// Documents skipped because they yielded no chunks
    pub skipped_count: usize,

    pub chunks_count: usize,

    /// Embedding dimension of the new index
    pub dimensions: Option<usize>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Lifecycle of one pipeline session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Empty,
    Indexed,
}

/// Snapshot of the current index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub state: PipelineState,
    pub documents_count: usize,
    pub chunks_count: usize,
    pub dimensions: Option<usize>,
    pub indexed_at: Option<DateTime<Utc>>,
}
