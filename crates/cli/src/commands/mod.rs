//! Command handlers for the docqa CLI.

pub mod ask;
pub mod chat;
pub mod chunks;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use chunks::ChunksCommand;

use docqa_core::{config::AppConfig, AppResult, Credential};
use docqa_knowledge::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use docqa_llm::{LlmClient, OpenAiClient};
use futures::{Stream, StreamExt};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Build the chat completion client from the `provider` config section.
fn completion_client(config: &AppConfig, credential: &Credential) -> AppResult<Arc<dyn LlmClient>> {
    let client = OpenAiClient::new(
        &config.provider.base_url,
        credential,
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

/// Build the embedding provider; `offline` selects the hashing embedder.
fn embedding_provider(
    config: &AppConfig,
    credential: &Credential,
    offline: bool,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if offline {
        tracing::info!("Offline mode: using hashing embeddings");
        create_provider(&EmbeddingConfig::offline(), None)
    } else {
        create_provider(&EmbeddingConfig::from_app_config(config), Some(credential))
    }
}

/// Print fragments to stdout as they arrive and return the full text.
async fn print_stream<S>(mut fragments: S) -> AppResult<String>
where
    S: Stream<Item = AppResult<String>> + Unpin,
{
    let mut full_content = String::new();
    let mut stdout = std::io::stdout();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        full_content.push_str(&fragment);
        print!("{}", fragment);
        stdout.flush().ok();
    }

    println!();
    Ok(full_content)
}

fn print_json(value: &serde_json::Value) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
