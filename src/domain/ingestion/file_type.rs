use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Document formats accepted by the document QA workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
}

impl FileType {
    /// Parse a declared type such as "pdf" or "DOCX".
    ///
    /// "doc" is read as a Word document. Anything else fails with
    /// "Unsupported file type: <input>".
    pub fn parse(declared: &str) -> Result<Self, DomainError> {
        match declared.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" | "doc" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(DomainError::ingestion(format!("Unsupported file type: {}", declared))),
        }
    }

    /// Infer the type from a path's extension
    pub fn from_path(path: &std::path::Path) -> Result<Self, DomainError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::parse(extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
