//! Prompt system for docqa.
//!
//! This crate provides:
//! - Handlebars-rendered RAG system/user templates with required placeholders
//! - YAML template overrides
//! - Keyword-based developer prompt selection for plain chat

pub mod builder;
pub mod classify;
pub mod loader;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::assemble;
pub use classify::{classify, PromptVariant};
pub use loader::load_templates;
pub use templates::RagTemplates;
pub use types::{AssembledPrompt, ContextBlock, PromptTemplate, StyleOptions};
