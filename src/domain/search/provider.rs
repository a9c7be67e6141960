//! Web search provider trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Web search capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, DomainError>;

    fn provider_name(&self) -> &'static str;
}
