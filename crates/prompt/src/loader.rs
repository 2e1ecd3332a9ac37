//! Loader for RAG template overrides.
//!
//! A template file is YAML with optional `system` and `user` keys. Keys that
//! are absent keep the built-in text.
//!
//! ```yaml
//! system: |
//!   Answer tersely. Style: {{response_style}}. Length: {{response_length}}.
//! ```

use crate::templates::{RagTemplates, RAG_SYSTEM_TEMPLATE, RAG_USER_TEMPLATE};
use crate::types::PromptTemplate;
use docqa_core::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    system: Option<String>,
    user: Option<String>,
}

/// Load RAG templates from `path`, falling back to the built-ins per key.
///
/// Every loaded template must reference all of its required placeholders.
///
/// # Example
/// ```no_run
/// use docqa_prompt::load_templates;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = load_templates(Path::new("prompts.yaml"))?;
/// println!("{}", templates.system.text());
/// # Ok(())
/// # }
/// ```
pub fn load_templates(path: &Path) -> AppResult<RagTemplates> {
    tracing::debug!("Loading prompt templates from: {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Template(format!("Failed to read template file {:?}: {}", path, e))
    })?;

    let file: TemplateFile = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Template(format!("Failed to parse template file {:?}: {}", path, e))
    })?;

    let templates = RagTemplates::from_text(
        file.system.as_deref().unwrap_or(RAG_SYSTEM_TEMPLATE),
        file.user.as_deref().unwrap_or(RAG_USER_TEMPLATE),
    )?;

    validate_template(&templates.system)?;
    validate_template(&templates.user)?;

    tracing::info!("Loaded prompt templates from {:?}", path);
    Ok(templates)
}

fn validate_template(template: &PromptTemplate) -> AppResult<()> {
    if template.text().trim().is_empty() {
        return Err(AppError::Template(format!(
            "Template '{}' cannot be empty",
            template.name()
        )));
    }

    let unreferenced: Vec<&str> = template
        .placeholders()
        .iter()
        .filter(|p| !template.references(p))
        .map(String::as_str)
        .collect();

    if !unreferenced.is_empty() {
        return Err(AppError::Template(format!(
            "Template '{}' does not reference required placeholders: {}",
            template.name(),
            unreferenced.join(", ")
        )));
    }

    Ok(())
}
