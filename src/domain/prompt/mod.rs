//! Variable templates for prompts and predefined documents

mod template;

pub use template::{render_template, PromptTemplate, TemplateError, TemplateVariable};
