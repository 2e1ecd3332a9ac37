//! Built-in RAG prompt templates.

use crate::types::PromptTemplate;
use docqa_core::AppResult;

pub const SYSTEM_PLACEHOLDERS: &[&str] = &["response_style", "response_length"];

pub const USER_PLACEHOLDERS: &[&str] = &[
    "context",
    "context_count",
    "similarity_scores",
    "user_query",
];

pub const RAG_SYSTEM_TEMPLATE: &str = r#"You are a helpful AI assistant that answers questions based solely on the provided context from uploaded documents.

Instructions:
- Only use information from the provided context to answer questions
- If the context doesn't contain enough information to answer the question, say "I don't have enough information in the provided context to answer that question."
- Be concise but thorough in your responses
- Cite specific parts of the context when relevant
- Do not use your general knowledge beyond what's in the context

Response style: {{response_style}}
Response length: {{response_length}}
"#;

pub const RAG_USER_TEMPLATE: &str = r#"Context from uploaded document(s):
{{context}}

Number of relevant sources: {{context_count}}
{{similarity_scores}}

Question: {{user_query}}

Please answer the question based solely on the context provided above.
"#;

/// The system/user template pair used to answer from retrieved context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagTemplates {
    pub system: PromptTemplate,
    pub user: PromptTemplate,
}

impl RagTemplates {
    /// Build from raw template text, declaring the standard placeholders.
    pub fn from_text(system: &str, user: &str) -> AppResult<Self> {
        Ok(Self {
            system: PromptTemplate::new("rag.system", system, SYSTEM_PLACEHOLDERS)?,
            user: PromptTemplate::new("rag.user", user, USER_PLACEHOLDERS)?,
        })
    }

    /// The built-in templates.
    pub fn builtin() -> AppResult<Self> {
        Self::from_text(RAG_SYSTEM_TEMPLATE, RAG_USER_TEMPLATE)
    }
}
