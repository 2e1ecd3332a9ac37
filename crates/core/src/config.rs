//! Configuration management for docqa.
//!
//! Configuration is layered:
//! - Built-in defaults
//! - YAML config file (`--config` or `DOCQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later layers override earlier ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credential::Credential;
use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Embedding/completion provider settings
    pub provider: ProviderSettings,

    /// Text splitting settings
    pub chunking: ChunkingSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,

    /// Answer rendering and delivery settings
    pub answer: AnswerSettings,

    /// Session lifetime settings
    pub sessions: SessionSettings,

    /// Optional YAML file overriding the RAG prompt templates
    #[serde(rename = "templatesFile", skip_serializing_if = "Option::is_none")]
    pub templates_file: Option<PathBuf>,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Provider API key. Never read from or written to the YAML file.
    #[serde(skip)]
    pub api_key: Option<Credential>,

    /// Path of the config file that was merged, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

/// OpenAI-compatible provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    #[serde(rename = "chatModel")]
    pub chat_model: String,

    #[serde(rename = "embeddingModel")]
    pub embedding_model: String,

    /// Request timeout in seconds, applied to both gateways
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Maximum texts per embedding request
    #[serde(rename = "batchSize")]
    pub batch_size: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_secs: 60,
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    #[serde(rename = "chunkSize")]
    pub chunk_size: usize,

    #[serde(rename = "chunkOverlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    #[serde(rename = "topK")]
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    #[serde(rename = "responseStyle")]
    pub response_style: String,

    #[serde(rename = "responseLength")]
    pub response_length: String,

    #[serde(rename = "includeScores")]
    pub include_scores: bool,

    /// Characters per streamed fragment when re-chunking a finished answer
    #[serde(rename = "fragmentSize")]
    pub fragment_size: usize,

    /// Cosmetic delay between streamed fragments, in milliseconds
    #[serde(rename = "pacingMs")]
    pub pacing_ms: u64,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            response_style: "detailed".to_string(),
            response_length: "comprehensive".to_string(),
            include_scores: true,
            fragment_size: 50,
            pacing_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Idle time after which a session is evicted
    #[serde(rename = "ttlSecs")]
    pub ttl_secs: u64,

    /// Upper bound on live sessions; least recently used is evicted first
    #[serde(rename = "maxSessions")]
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            max_sessions: 64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub color: Option<bool>,
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_API_KEY` (falls back to `OPENAI_API_KEY`): provider credential
    /// - `DOCQA_BASE_URL`: provider base URL
    /// - `DOCQA_CHAT_MODEL`: completion model
    /// - `DOCQA_EMBEDDING_MODEL`: embedding model
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Chat model: {}", config.provider.chat_model);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let path = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(ref p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse a YAML config file. Missing sections fall back to defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Configuration(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.config_file = Some(path.to_path_buf());
        tracing::debug!("Loaded config file {:?}", path);
        Ok(config)
    }

    fn apply_env(&mut self) {
        let api_key = std::env::var("DOCQA_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .map(Credential::new)
            .filter(|c| !c.is_empty());
        if api_key.is_some() {
            self.api_key = api_key;
        }

        if let Ok(url) = std::env::var("DOCQA_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Ok(model) = std::env::var("DOCQA_CHAT_MODEL") {
            self.provider.chat_model = model;
        }
        if let Ok(model) = std::env::var("DOCQA_EMBEDDING_MODEL") {
            self.provider.embedding_model = model;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level.get_or_insert(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.logging.color = Some(false);
        }
    }

    /// Apply CLI overrides. Flags take precedence over everything else.
    pub fn with_overrides(mut self, log_level: Option<String>, verbose: bool, no_color: bool) -> Self {
        if let Some(level) = log_level {
            self.logging.level = Some(level);
        }

        // Verbose implies debug unless a level was given explicitly
        if verbose && self.logging.level.is_none() {
            self.logging.level = Some("debug".to_string());
        }

        if no_color {
            self.logging.color = Some(false);
        }

        self
    }

    pub fn no_color(&self) -> bool {
        self.logging.color == Some(false)
    }

    /// The credential, or a configuration error naming where to put it.
    pub fn require_api_key(&self) -> AppResult<Credential> {
        self.api_key.clone().ok_or_else(|| {
            AppError::Configuration(
                "No provider API key. Set DOCQA_API_KEY or OPENAI_API_KEY.".to_string(),
            )
        })
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::Configuration(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Configuration(
                "topK must be at least 1".to_string(),
            ));
        }

        if self.provider.batch_size == 0 {
            return Err(AppError::Configuration(
                "batchSize must be at least 1".to_string(),
            ));
        }

        if self.answer.fragment_size == 0 {
            return Err(AppError::Configuration(
                "fragmentSize must be at least 1".to_string(),
            ));
        }

        if self.sessions.max_sessions == 0 {
            return Err(AppError::Configuration(
                "maxSessions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
