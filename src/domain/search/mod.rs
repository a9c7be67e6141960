//! Search domain: web search seam and the deterministic parts of legal
//! clarification (keyword fallback, result validation, summary text handling)

mod keywords;
mod provider;
mod summary;
mod validation;

pub use keywords::{build_search_query, fallback_keywords, parse_keywords};
pub use provider::{SearchProvider, SearchResult};
pub use summary::{clean_text, combine_content, parse_citations, SummaryMode};
pub use validation::{ValidationDecision, ValidationPolicy};

#[cfg(test)]
pub use provider::MockSearchProvider;
