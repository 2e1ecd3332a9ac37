//! Prompt types for docqa.

use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A template with a fixed set of named, required placeholders.
///
/// Rendering checks that every placeholder has a value before handing the
/// text to Handlebars in strict mode, so a missing value is an error rather
/// than an empty hole or a literal `{{name}}` in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
    placeholders: Vec<String>,
}

impl PromptTemplate {
    /// Create a template, rejecting text Handlebars cannot parse.
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        placeholders: &[&str],
    ) -> AppResult<Self> {
        let template = Self {
            name: name.into(),
            text: text.into(),
            placeholders: placeholders.iter().map(|p| p.to_string()).collect(),
        };

        // Parse once up front so malformed templates fail at construction
        template.registry()?;
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Whether the template text references `placeholder`.
    pub fn references(&self, placeholder: &str) -> bool {
        let mut rest = self.text.as_str();
        while let Some(open) = rest.find("{{") {
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                return false;
            };
            if after[..close].trim() == placeholder {
                return true;
            }
            rest = &after[close + 2..];
        }
        false
    }

    /// Render with `values`. Extra values are ignored.
    pub fn render(&self, values: &HashMap<String, String>) -> AppResult<String> {
        let missing: Vec<&str> = self
            .placeholders
            .iter()
            .filter(|p| !values.contains_key(p.as_str()))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Template(format!(
                "Template '{}' is missing values for: {}",
                self.name,
                missing.join(", ")
            )));
        }

        self.registry()?
            .render(&self.name, values)
            .map_err(|e| {
                AppError::Template(format!("Failed to render template '{}': {}", self.name, e))
            })
    }

    fn registry(&self) -> AppResult<Handlebars<'static>> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(&self.name, &self.text)
            .map_err(|e| {
                AppError::Template(format!("Failed to parse template '{}': {}", self.name, e))
            })?;
        Ok(handlebars)
    }
}

/// Free-form answer style options, inserted verbatim into the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub response_style: String,
    pub response_length: String,
    /// Include the "Relevance scores" line in the user prompt
    pub include_scores: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            response_style: "detailed".to_string(),
            response_length: "detailed".to_string(),
            include_scores: false,
        }
    }
}

/// One retrieved context block handed to the assembler.
#[derive(Debug, Clone, Copy)]
pub struct ContextBlock<'a> {
    pub text: &'a str,
    pub score: f32,
}

/// A fully assembled system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,

    /// `"Source i: 0.123"` labels for each context block, in rank order
    #[serde(rename = "similarityScores")]
    pub similarity_scores: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let template = PromptTemplate::new("q", "Question: {{query}}", &["query"]).unwrap();
        let rendered = template.render(&values(&[("query", "Hello, world!")])).unwrap();
        assert_eq!(rendered, "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let template = PromptTemplate::new("q", "{{query}}", &["query"]).unwrap();
        let rendered = template.render(&values(&[("query", "a < b && \"c\"")])).unwrap();
        assert_eq!(rendered, "a < b && \"c\"");
    }

    #[test]
    fn test_render_missing_placeholder() {
        let template =
            PromptTemplate::new("sys", "{{response_style}} / {{response_length}}", &[
                "response_style",
                "response_length",
            ])
            .unwrap();

        let err = template
            .render(&values(&[("response_style", "detailed")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
        assert!(err.to_string().contains("response_length"));
    }

    #[test]
    fn test_render_undeclared_reference_fails() {
        // strict mode catches references that were never declared
        let template = PromptTemplate::new("t", "{{declared}} {{stray}}", &["declared"]).unwrap();
        let err = template.render(&values(&[("declared", "x")])).unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }

    #[test]
    fn test_render_ignores_extra_values() {
        let template = PromptTemplate::new("t", "{{a}}", &["a"]).unwrap();
        let rendered = template
            .render(&values(&[("a", "1"), ("unused", "2")]))
            .unwrap();
        assert_eq!(rendered, "1");
    }

    #[test]
    fn test_malformed_template_rejected() {
        let result = PromptTemplate::new("bad", "{{#if x}}unclosed", &[]);
        assert!(matches!(result, Err(AppError::Template(_))));
    }

    #[test]
    fn test_references() {
        let template = PromptTemplate::new("t", "A {{ a }} and {{b}}", &["a", "b"]).unwrap();
        assert!(template.references("a"));
        assert!(template.references("b"));
        assert!(!template.references("c"));
    }
}
