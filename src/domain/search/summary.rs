use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::SearchResult;
use crate::domain::DomainError;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static URLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static STRAY_SYMBOLS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[^\w\s.,;:()"'-]"#).unwrap());
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\s*").unwrap());
static LEADING_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*").unwrap());

/// Separator placed between snippets in the summarised content
pub const CONTENT_SEPARATOR: &str = "\n\n---\n\n";

const MIN_CITATION_LENGTH: usize = 10;

/// Summary flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// Structured summary plus extracted citations
    #[default]
    Comprehensive,
    /// Short focused answer
    Quick,
}

impl SummaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comprehensive => "comprehensive",
            Self::Quick => "quick",
        }
    }

    pub fn extracts_citations(&self) -> bool {
        matches!(self, Self::Comprehensive)
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummaryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comprehensive" => Ok(Self::Comprehensive),
            "quick" => Ok(Self::Quick),
            other => Err(DomainError::validation(format!("Unknown summary mode: {}", other))),
        }
    }
}

/// Normalise a snippet: collapse whitespace, drop tags, URLs and stray symbols
pub fn clean_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = TAGS.replace_all(&text, "");
    let text = URLS.replace_all(&text, "");
    let text = STRAY_SYMBOLS.replace_all(&text, "");
    text.trim().to_string()
}

/// Cleaned snippets longer than `min_length` characters, joined by [`CONTENT_SEPARATOR`]
pub fn combine_content(results: &[SearchResult], min_length: usize) -> String {
    results
        .iter()
        .map(|r| clean_text(&r.content))
        .filter(|content| content.chars().count() > min_length)
        .collect::<Vec<_>>()
        .join(CONTENT_SEPARATOR)
}

/// Numbered or bulleted lines of a citation listing, numbering stripped
pub fn parse_citations(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()) || line.starts_with('-'))
        .map(|line| {
            let line = LEADING_NUMBER.replace(line, "");
            LEADING_DASH.replace(&line, "").into_owned()
        })
        .filter(|citation| citation.chars().count() > MIN_CITATION_LENGTH)
        .take(max)
        .collect()
}
