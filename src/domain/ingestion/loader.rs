//! Document loader trait

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::FileType;
use crate::domain::DomainError;

/// A piece of extracted document text (a PDF page or a whole text file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSegment {
    pub source: String,
    pub index: usize,
    pub text: String,
}

impl DocumentSegment {
    pub fn new(source: impl Into<String>, index: usize, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            index,
            text: text.into(),
        }
    }
}

/// Extracts text segments from a file of a declared type
#[async_trait]
pub trait DocumentLoader: Send + Sync + Debug {
    async fn load(&self, path: &Path, file_type: FileType) -> Result<Vec<DocumentSegment>, DomainError>;
}
