//! Recursive chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

const DEEPEST_LEVEL: usize = 3;

/// Chunking strategy that recursively splits text hierarchically
///
/// Splitting order: paragraphs -> lines -> sentences -> words -> characters.
/// Sizes are counted in characters. With a non-zero overlap, each chunk after
/// the first starts with the tail of the previous one.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl RecursiveChunker {
    pub fn new() -> Self {
        Self
    }

    fn split_level(text: &str, level: usize) -> Vec<&str> {
        let parts: Vec<&str> = match level {
            0 => text.split("\n\n").collect(),
            1 => text.lines().collect(),
            2 => text.unicode_sentences().collect(),
            _ => text.split_whitespace().collect(),
        };

        parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn separator(level: usize) -> &'static str {
        match level {
            0 => "\n\n",
            1 => "\n",
            _ => " ",
        }
    }

    fn recursive_chunk(text: &str, size: usize, level: usize) -> Vec<String> {
        if char_len(text) <= size {
            return vec![text.to_string()];
        }

        if level > DEEPEST_LEVEL {
            return Self::split_by_chars(text, size);
        }

        let parts = Self::split_level(text, level);

        if parts.len() <= 1 {
            return Self::recursive_chunk(text, size, level + 1);
        }

        let separator = Self::separator(level);
        let mut result = Vec::new();
        let mut current = String::new();

        for part in parts {
            if current.is_empty() {
                current = part.to_string();
            } else if char_len(&current) + separator.len() + char_len(part) <= size {
                current.push_str(separator);
                current.push_str(part);
            } else {
                Self::flush(&mut result, std::mem::take(&mut current), size, level);
                current = part.to_string();
            }
        }

        if !current.is_empty() {
            Self::flush(&mut result, current, size, level);
        }

        result
    }

    fn flush(result: &mut Vec<String>, piece: String, size: usize, level: usize) {
        if char_len(&piece) > size {
            result.extend(Self::recursive_chunk(&piece, size, level + 1));
        } else {
            result.push(piece);
        }
    }

    fn split_by_chars(text: &str, size: usize) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars.chunks(size).map(|c| c.iter().collect()).collect()
    }

    /// Last `max_chars` characters of `text`, starting at a word boundary when possible
    fn tail(text: &str, max_chars: usize) -> &str {
        let total = char_len(text);
        if max_chars == 0 || total == 0 {
            return "";
        }

        let skip = total.saturating_sub(max_chars);
        let start = text
            .char_indices()
            .nth(skip)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let tail = &text[start..];

        if skip == 0 {
            return tail.trim();
        }

        match tail.find(char::is_whitespace) {
            Some(pos) => tail[pos..].trim(),
            None => tail.trim(),
        }
    }

    fn apply_overlap(pieces: Vec<String>, overlap: usize) -> Vec<String> {
        if overlap == 0 || pieces.len() < 2 {
            return pieces;
        }

        let mut result = Vec::with_capacity(pieces.len());
        let mut previous: Option<String> = None;

        for piece in pieces {
            let chunk = match previous.as_deref().map(|p| Self::tail(p, overlap - 1)) {
                Some(tail) if !tail.is_empty() => format!("{} {}", tail, piece),
                _ => piece.clone(),
            };
            previous = Some(piece);
            result.push(chunk);
        }

        result
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn split(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        if char_len(content) <= config.chunk_size {
            return Ok(vec![content.to_string()]);
        }

        let base_size = config.chunk_size - config.chunk_overlap;
        let pieces = Self::recursive_chunk(content, base_size, 0);

        Ok(Self::apply_overlap(pieces, config.chunk_overlap))
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
