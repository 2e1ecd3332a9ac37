//! Prompt assembly for grounded answers.

use crate::templates::RagTemplates;
use crate::types::{AssembledPrompt, ContextBlock, StyleOptions};
use docqa_core::AppResult;
use std::collections::HashMap;

/// Build the system and user prompts for `query` over `contexts`.
///
/// `contexts` must already be in rank order; blocks are numbered from 1.
/// The user prompt carries:
/// - one `[Source i]: <text>` block per context, separated by blank lines
/// - the number of sources
/// - a `Relevance scores: ...` line when `style.include_scores` is set
/// - the query text, verbatim
///
/// # Example
/// ```no_run
/// use docqa_prompt::{assemble, ContextBlock, RagTemplates, StyleOptions};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = RagTemplates::builtin()?;
/// let contexts = [ContextBlock { text: "DynamoDB is a key-value store.", score: 0.91 }];
/// let prompt = assemble(&templates, "What is DynamoDB?", &contexts, &StyleOptions::default())?;
/// println!("{}", prompt.user);
/// # Ok(())
/// # }
/// ```
pub fn assemble(
    templates: &RagTemplates,
    query: &str,
    contexts: &[ContextBlock<'_>],
    style: &StyleOptions,
) -> AppResult<AssembledPrompt> {
    tracing::debug!(
        contexts = contexts.len(),
        include_scores = style.include_scores,
        "Assembling RAG prompt"
    );

    let mut system_values = HashMap::new();
    system_values.insert("response_style".to_string(), style.response_style.clone());
    system_values.insert("response_length".to_string(), style.response_length.clone());
    let system = templates.system.render(&system_values)?;

    let (context, similarity_scores) = format_context(contexts);

    let scores_line = if style.include_scores && !similarity_scores.is_empty() {
        format!("Relevance scores: {}", similarity_scores.join(", "))
    } else {
        String::new()
    };

    let mut user_values = HashMap::new();
    user_values.insert("user_query".to_string(), query.to_string());
    user_values.insert("context".to_string(), context);
    user_values.insert("context_count".to_string(), contexts.len().to_string());
    user_values.insert("similarity_scores".to_string(), scores_line);
    let user = templates.user.render(&user_values)?;

    Ok(AssembledPrompt {
        system,
        user,
        similarity_scores: if style.include_scores {
            similarity_scores
        } else {
            Vec::new()
        },
    })
}

/// Numbered context blocks plus their `Source i: score` labels.
fn format_context(contexts: &[ContextBlock<'_>]) -> (String, Vec<String>) {
    let mut blocks = Vec::with_capacity(contexts.len());
    let mut scores = Vec::with_capacity(contexts.len());

    for (i, block) in contexts.iter().enumerate() {
        let n = i + 1;
        blocks.push(format!("[Source {}]: {}", n, block.text));
        scores.push(format!("Source {}: {:.3}", n, block.score));
    }

    (blocks.join("\n\n").trim().to_string(), scores)
}
