//! Ask command handler.
//!
//! Ingests the given files into a session pipeline and answers one question
//! from them. The session store lives in this process only, so a session
//! key names the pipeline for a single run and is echoed in JSON output.

use super::{completion_client, embedding_provider, print_json, print_stream};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{
    load_documents, AnswerOptions, InMemorySessionStore, Pipeline, RetrievalResult,
};
use docqa_llm::fragment_stream;
use std::path::PathBuf;
use std::time::Duration;

/// Answer a question from uploaded documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Document to answer from (PDF, Markdown or text); repeat for several
    #[arg(short, long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Response style inserted into the system prompt
    #[arg(long)]
    pub style: Option<String>,

    /// Response length inserted into the system prompt
    #[arg(long)]
    pub length: Option<String>,

    /// Leave relevance scores out of the prompt and output
    #[arg(long)]
    pub no_scores: bool,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Fetch the whole answer, then replay it in fixed-size fragments
    #[arg(long, conflicts_with = "no_stream")]
    pub paced: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Session key for this run; sessions are not kept between runs
    #[arg(long, default_value = "default")]
    pub session: String,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig, offline: bool) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.question.join(" ");
        let credential = config.require_api_key()?;

        let sessions = InMemorySessionStore::from_settings(&config.sessions);
        let session = sessions.get_or_create(&self.session, || {
            Pipeline::from_config(
                config,
                embedding_provider(config, &credential, offline)?,
                completion_client(config, &credential)?,
            )
        })?;
        let mut pipeline = session.lock().await;

        let documents = load_documents(&self.files);
        let stats = pipeline.ingest(&documents).await?;
        tracing::info!(
            "Indexed {} chunks from {} documents",
            stats.chunks_count,
            stats.documents_count
        );

        let options = self.answer_options(config);

        if self.json || self.no_stream {
            let answer = pipeline.answer(&query, &options).await?;

            if self.json {
                print_json(&serde_json::json!({
                    "answer": answer.answer,
                    "contextCount": answer.context_count,
                    "similarityScores": answer.similarity_scores,
                    "sources": sources_json(&answer.retrieval),
                    "session": self.session,
                }))?;
            } else {
                println!("{}", answer.answer);
                print_scores(answer.similarity_scores.as_deref());
            }
        } else if self.paced {
            let answer = pipeline.answer(&query, &options).await?;
            print_stream(fragment_stream(
                &answer.answer,
                config.answer.fragment_size,
                Duration::from_millis(config.answer.pacing_ms),
            ))
            .await?;
            print_scores(answer.similarity_scores.as_deref());
        } else {
            let stream = pipeline.answer_stream(&query, &options).await?;
            print_stream(stream.fragments).await?;
            print_scores(stream.similarity_scores.as_deref());
        }

        Ok(())
    }

    /// Config defaults overridden by flags.
    fn answer_options(&self, config: &AppConfig) -> AnswerOptions {
        let mut options = AnswerOptions::from_config(config);

        if let Some(top_k) = self.top_k {
            options.top_k = top_k;
        }
        if let Some(style) = &self.style {
            options.style.response_style = style.clone();
        }
        if let Some(length) = &self.length {
            options.style.response_length = length.clone();
        }
        if self.no_scores {
            options.style.include_scores = false;
        }

        options
    }
}

fn sources_json(retrieval: &RetrievalResult) -> serde_json::Value {
    retrieval
        .chunks
        .iter()
        .map(|c| {
            serde_json::json!({
                "source": c.chunk.source,
                "position": c.chunk.position,
                "offset": c.chunk.offset,
                "score": c.score,
            })
        })
        .collect()
}

fn print_scores(scores: Option<&[String]>) {
    if let Some(scores) = scores.filter(|s| !s.is_empty()) {
        println!("\nRelevance scores: {}", scores.join(", "));
    }
}
