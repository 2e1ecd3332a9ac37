//! Chunks command handler.
//!
//! Previews how documents will be split, without calling any provider.

use super::print_json;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{chunker, load_documents, Chunk};
use std::path::PathBuf;

/// Length of the text preview printed per chunk.
const PREVIEW_CHARS: usize = 60;

/// Show how documents are split into chunks
#[derive(Args, Debug)]
pub struct ChunksCommand {
    /// Document to split; repeat for several
    #[arg(short, long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Chunk size in characters (default from config)
    #[arg(long)]
    pub size: Option<usize>,

    /// Overlap between consecutive chunks in characters (default from config)
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChunksCommand {
    /// Execute the chunks command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chunks command");

        let size = self.size.unwrap_or(config.chunking.chunk_size);
        let overlap = self.overlap.unwrap_or(config.chunking.chunk_overlap);
        chunker::validate_params(size, overlap)?;

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in load_documents(&self.files) {
            chunks.extend(chunker::split_document(&document, size, overlap)?);
        }

        if self.json {
            print_json(&serde_json::to_value(&chunks)?)?;
            return Ok(());
        }

        for chunk in &chunks {
            println!("{}", describe(chunk));
        }
        println!(
            "{} chunks (size: {}, overlap: {})",
            chunks.len(),
            size,
            overlap
        );

        Ok(())
    }
}

fn describe(chunk: &Chunk) -> String {
    let len = chunk.text.chars().count();
    let mut preview: String = chunk
        .text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if len > PREVIEW_CHARS {
        preview.push_str("...");
    }

    format!(
        "{}#{} [{}..{}] {}",
        chunk.source,
        chunk.position,
        chunk.offset,
        chunk.offset + len,
        preview
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_chunk() {
        let chunk = Chunk {
            source: "dynamo.txt".to_string(),
            position: 1,
            offset: 800,
            text: "DynamoDB\nis a key-value store.".to_string(),
        };
        assert_eq!(
            describe(&chunk),
            "dynamo.txt#1 [800..830] DynamoDB is a key-value store."
        );
    }

    #[test]
    fn test_describe_truncates_preview() {
        let chunk = Chunk {
            source: "long.txt".to_string(),
            position: 0,
            offset: 0,
            text: "x".repeat(100),
        };
        let line = describe(&chunk);
        assert!(line.starts_with("long.txt#0 [0..100] "));
        assert!(line.ends_with("..."));
    }
}
