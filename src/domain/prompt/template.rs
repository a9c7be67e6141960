//! Template parsing and rendering
//!
//! Supports variable syntax: `${var:variable_name:default-value}`
//! - `${var:name}` - Required variable, error if not provided
//! - `${var:name:default}` - Optional variable with default value (may be empty)
//!
//! Used both for prompts sent to the backends and for the predefined
//! document templates of the drafting workflow.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// Regex to match variable patterns: ${var:name} or ${var:name:default}
static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{var:([a-zA-Z0-9][-_a-zA-Z0-9]*)(?::([^}]*))?\}").unwrap()
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },

    #[error("Template parsing error: {message}")]
    ParseError { message: String },
}

/// A parsed variable from a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariable {
    pub name: String,
    pub default: Option<String>,
}

impl TemplateVariable {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    variables: Vec<TemplateVariable>,
}

impl PromptTemplate {
    /// Parse a template string and extract its variables
    pub fn parse(content: impl Into<String>) -> Result<Self, TemplateError> {
        let content = content.into();

        let opened = content.matches("${var:").count();
        let matched = VARIABLE_PATTERN.find_iter(&content).count();
        if opened != matched {
            return Err(TemplateError::ParseError {
                message: format!("{} malformed variable reference(s)", opened - matched.min(opened)),
            });
        }

        let mut seen = HashSet::new();
        let variables = VARIABLE_PATTERN
            .captures_iter(&content)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().to_string();
                if !seen.insert(name.clone()) {
                    return None;
                }
                Some(TemplateVariable {
                    name,
                    default: cap.get(2).map(|m| m.as_str().to_string()),
                })
            })
            .collect();

        Ok(Self { content, variables })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[TemplateVariable] {
        &self.variables
    }

    /// Names of required variables not present in `values`
    pub fn missing_variables(&self, values: &HashMap<String, String>) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|v| v.is_required() && !values.contains_key(&v.name))
            .map(|v| v.name.as_str())
            .collect()
    }

    /// Render the template with provided values, falling back to defaults
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(name) = self.missing_variables(values).first() {
            return Err(TemplateError::MissingVariable {
                name: name.to_string(),
            });
        }

        let rendered = VARIABLE_PATTERN.replace_all(&self.content, |cap: &Captures| {
            let name = &cap[1];
            values
                .get(name)
                .cloned()
                .or_else(|| cap.get(2).map(|m| m.as_str().to_string()))
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

/// Convenience function to render a template string directly
pub fn render_template(template: &str, values: &HashMap<String, String>) -> Result<String, TemplateError> {
    PromptTemplate::parse(template)?.render(values)
}
