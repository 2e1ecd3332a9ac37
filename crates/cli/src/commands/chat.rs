//! Chat command handler.
//!
//! Plain chat without documents. The developer prompt is picked from the
//! message by keyword unless `--variant` names one.

use super::{completion_client, print_json, print_stream};
use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_llm::CompletionGateway;
use docqa_prompt::{classify, PromptVariant};

/// Chat with the model without document context
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The message to send
    #[arg(required = true)]
    pub message: Vec<String>,

    /// Developer prompt variant (default, educational, summarization,
    /// creative-writing, math-problem, tone-conversion)
    #[arg(long)]
    pub variant: Option<String>,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let message = self.message.join(" ");
        let variant = self.resolve_variant(&message)?;
        tracing::debug!("Using prompt variant: {}", variant.as_str());

        let credential = config.require_api_key()?;
        let gateway = CompletionGateway::new(
            completion_client(config, &credential)?,
            config.provider.chat_model.clone(),
        )
        .with_temperature(Some(0.7));

        if self.json {
            let reply = gateway.complete(variant.template(), &message).await?;
            print_json(&serde_json::json!({
                "reply": reply,
                "variant": variant.as_str(),
                "model": gateway.model(),
            }))?;
        } else if self.no_stream {
            let reply = gateway.complete(variant.template(), &message).await?;
            println!("{}", reply);
        } else {
            let fragments = gateway
                .complete_stream(variant.template(), &message)
                .await?;
            print_stream(fragments).await?;
        }

        Ok(())
    }

    fn resolve_variant(&self, message: &str) -> AppResult<PromptVariant> {
        match &self.variant {
            Some(name) => PromptVariant::parse(name).ok_or_else(|| {
                let known: Vec<&str> = PromptVariant::ALL.iter().map(|v| v.as_str()).collect();
                AppError::Configuration(format!(
                    "Unknown prompt variant '{}'. Expected one of: {}",
                    name,
                    known.join(", ")
                ))
            }),
            None => Ok(classify(message)),
        }
    }
}
