//! docqa CLI
//!
//! Main entry point for the docqa command-line tool.
//! Answers questions from PDF and text documents with retrieval-augmented
//! generation.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ChunksCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docqa - ask questions about your documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Use offline hashing embeddings instead of the embeddings API
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from uploaded documents
    Ask(AskCommand),

    /// Chat with the model without document context
    Chat(ChatCommand),

    /// Show how documents are split into chunks
    Chunks(ChunksCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file, then environment
    let config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_logging(config.logging.level.as_deref(), config.no_color())?;

    config.validate()?;

    tracing::info!("docqa starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Chat model: {}", config.provider.chat_model);
    tracing::debug!("Embedding model: {}", config.provider.embedding_model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Chunks(_) => "chunks",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config, cli.offline).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Chunks(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "docqa", "--offline", "ask", "What", "is", "DynamoDB?", "--file", "dynamo.pdf",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.offline);
        assert!(cli.verbose);
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.question, vec!["What", "is", "DynamoDB?"]);
                assert_eq!(cmd.files, vec![PathBuf::from("dynamo.pdf")]);
            }
            other => panic!("expected ask, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_file() {
        assert!(Cli::try_parse_from(["docqa", "ask", "question"]).is_err());
    }

    #[test]
    fn test_ask_rejects_negative_top_k() {
        assert!(
            Cli::try_parse_from(["docqa", "ask", "q", "-f", "a.txt", "--top-k", "-1"]).is_err()
        );
    }

    #[test]
    fn test_session_help_states_single_run_scope() {
        use clap::CommandFactory;

        let cli = Cli::command();
        let ask = cli.find_subcommand("ask").unwrap();
        let session = ask
            .get_arguments()
            .find(|arg| arg.get_id() == "session")
            .unwrap();
        let help = session.get_help().unwrap().to_string();
        assert!(help.contains("not kept between runs"));
    }

    #[test]
    fn test_parse_chat_variant() {
        let cli =
            Cli::try_parse_from(["docqa", "chat", "tell", "me", "a", "story", "--no-stream"])
                .unwrap();
        match cli.command {
            Commands::Chat(cmd) => {
                assert!(cmd.no_stream);
                assert!(cmd.variant.is_none());
            }
            other => panic!("expected chat, got {:?}", other),
        }
    }
}
