//! RAG pipeline orchestration for one session.
//!
//! A pipeline starts EMPTY. A successful [`Pipeline::ingest`] builds a vector
//! index and moves it to INDEXED; later ingests replace the index wholesale.
//! A failed ingest leaves the previous state untouched.

use crate::chunker;
use crate::embeddings::{EmbeddingGateway, EmbeddingProvider};
use crate::retriever::Retriever;
use crate::types::{
    Answer, AnswerOptions, AnswerStream, Chunk, Document, IngestStats, PipelineState,
    PipelineStats, RetrievalResult,
};
use crate::vector_index::VectorIndex;
use chrono::{DateTime, Utc};
use docqa_core::config::ChunkingSettings;
use docqa_core::{AppConfig, AppError, AppResult};
use docqa_llm::{CompletionGateway, LlmClient};
use docqa_prompt::{assemble, load_templates, AssembledPrompt, RagTemplates};
use std::sync::Arc;
use std::time::Instant;

/// Composes splitting, embedding, retrieval, prompt assembly and completion.
pub struct Pipeline {
    embeddings: EmbeddingGateway,
    completions: CompletionGateway,
    templates: RagTemplates,
    chunking: ChunkingSettings,
    index: Option<VectorIndex>,
    documents_count: usize,
    indexed_at: Option<DateTime<Utc>>,
}

impl Pipeline {
    pub fn new(
        embeddings: EmbeddingGateway,
        completions: CompletionGateway,
        templates: RagTemplates,
        chunking: ChunkingSettings,
    ) -> AppResult<Self> {
        chunker::validate_params(chunking.chunk_size, chunking.chunk_overlap)?;

        Ok(Self {
            embeddings,
            completions,
            templates,
            chunking,
            index: None,
            documents_count: 0,
            indexed_at: None,
        })
    }

    /// Wire a pipeline from application config and the two provider clients.
    ///
    /// Loads the template override file when one is configured.
    pub fn from_config(
        config: &AppConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        completions: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let templates = match &config.templates_file {
            Some(path) => load_templates(path)?,
            None => RagTemplates::builtin()?,
        };

        Self::new(
            EmbeddingGateway::new(embeddings, config.provider.batch_size)?,
            CompletionGateway::new(completions, config.provider.chat_model.clone()),
            templates,
            config.chunking,
        )
    }

    pub fn state(&self) -> PipelineState {
        if self.index.is_some() {
            PipelineState::Indexed
        } else {
            PipelineState::Empty
        }
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            state: self.state(),
            documents_count: self.documents_count,
            chunks_count: self.index.as_ref().map(VectorIndex::len).unwrap_or(0),
            dimensions: self.index.as_ref().and_then(VectorIndex::dimensions),
            indexed_at: self.indexed_at,
        }
    }

    /// Split, embed and index `documents`, replacing any previous index.
    ///
    /// Documents that yield no chunks are skipped with a warning. Fails with
    /// [`AppError::Ingest`] when no document yields a chunk.
    pub async fn ingest(&mut self, documents: &[Document]) -> AppResult<IngestStats> {
        let start = Instant::now();

        tracing::info!("Starting ingest of {} documents", documents.len());

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut documents_count = 0usize;
        let mut skipped_count = 0usize;

        for document in documents {
            let doc_chunks = chunker::split_document(
                document,
                self.chunking.chunk_size,
                self.chunking.chunk_overlap,
            )?;

            if doc_chunks.is_empty() {
                tracing::warn!("Skipping '{}': no text to index", document.source);
                skipped_count += 1;
                continue;
            }

            documents_count += 1;
            chunks.extend(doc_chunks);
        }

        if chunks.is_empty() {
            return Err(AppError::Ingest(format!(
                "No chunks produced from {} documents",
                documents.len()
            )));
        }

        let chunks_count = chunks.len();
        let index = VectorIndex::build(chunks, &self.embeddings).await?;
        let dimensions = index.dimensions();

        self.index = Some(index);
        self.documents_count = documents_count;
        self.indexed_at = Some(Utc::now());

        let duration = start.elapsed();

        tracing::info!(
            "Ingest completed: {} documents ({} skipped), {} chunks in {:.2}s",
            documents_count,
            skipped_count,
            chunks_count,
            duration.as_secs_f64()
        );

        Ok(IngestStats {
            documents_count,
            skipped_count,
            chunks_count,
            dimensions,
            duration_secs: duration.as_secs_f64(),
        })
    }

    /// Retrieve the top chunks without calling the completion model.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<RetrievalResult> {
        Retriever::new(&self.embeddings, self.index.as_ref())
            .retrieve(query, top_k)
            .await
    }

    /// Answer `query` from the indexed documents.
    pub async fn answer(&self, query: &str, options: &AnswerOptions) -> AppResult<Answer> {
        let (retrieval, prompt) = self.prepare(query, options).await?;

        let answer = self
            .completions
            .complete(&prompt.system, &prompt.user)
            .await?;

        Ok(Answer {
            answer,
            context_count: retrieval.len(),
            similarity_scores: options
                .style
                .include_scores
                .then_some(prompt.similarity_scores),
            retrieval,
            system_prompt: prompt.system,
            user_prompt: prompt.user,
        })
    }

    /// Like [`Pipeline::answer`], but stream the completion as it arrives.
    pub async fn answer_stream(
        &self,
        query: &str,
        options: &AnswerOptions,
    ) -> AppResult<AnswerStream> {
        let (retrieval, prompt) = self.prepare(query, options).await?;

        let fragments = self
            .completions
            .complete_stream(&prompt.system, &prompt.user)
            .await?;

        Ok(AnswerStream {
            context_count: retrieval.len(),
            similarity_scores: options
                .style
                .include_scores
                .then_some(prompt.similarity_scores),
            retrieval,
            fragments,
        })
    }

    async fn prepare(
        &self,
        query: &str,
        options: &AnswerOptions,
    ) -> AppResult<(RetrievalResult, AssembledPrompt)> {
        tracing::info!("Answering query with top_k={}", options.top_k);

        let retrieval = self.retrieve(query, options.top_k).await?;
        let prompt = assemble(
            &self.templates,
            query,
            &retrieval.context_blocks(),
            &options.style,
        )?;

        Ok((retrieval, prompt))
    }
}
