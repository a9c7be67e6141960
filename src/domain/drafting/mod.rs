//! Drafting domain: document categories, question schemas and templates
//!
//! The drafting workflow is a deterministic fill-in-the-blanks state machine.
//! A category is resolved from free text via a fixed alias table, then every
//! field of the category schema is asked in order before a document is
//! rendered.

mod catalog;
mod identification;
mod templates;

pub use catalog::{DocumentType, FieldSpec};
pub use identification::{identify_document_type, CLARIFICATION_QUESTION};
pub use templates::{format_collected_info, render_document, DATE_FORMAT};
