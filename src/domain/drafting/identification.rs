use once_cell::sync::Lazy;
use regex::Regex;

use super::DocumentType;

/// Asked when free text does not name a known document category
pub const CLARIFICATION_QUESTION: &str =
    "Could you please specify the type of document you want to create? (NDA, Contract, or Lease Agreement)";

/// Aliases in match priority order
const ALIASES: &[(&str, DocumentType)] = &[
    ("nda", DocumentType::Nda),
    ("non-disclosure agreement", DocumentType::Nda),
    ("contract", DocumentType::Contract),
    ("service agreement", DocumentType::Contract),
    ("employment contract", DocumentType::Contract),
    ("employment agreement", DocumentType::Contract),
    ("lease", DocumentType::Lease),
    ("lease agreement", DocumentType::Lease),
    ("rental agreement", DocumentType::Lease),
    ("residential lease agreement", DocumentType::Lease),
];

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+(?:-[a-z0-9]+)*").unwrap());

/// Lower-cased words with a simple plural `s` removed ("leases" -> "lease")
fn words(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(&text.to_lowercase())
        .map(|m| singular(m.as_str()).to_string())
        .collect()
}

fn singular(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(stem) if stem.len() >= 3 && !stem.ends_with('s') => stem,
        _ => word,
    }
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && haystack.windows(phrase.len()).any(|window| window == phrase)
}

/// Resolve a document category from free text.
///
/// An alias appearing as a whole phrase wins first; otherwise the first alias
/// sharing any word with the input is used. Words are compared whole after
/// plural folding, so "leases" matches but "please" does not. `None` means the
/// caller should ask [`CLARIFICATION_QUESTION`].
pub fn identify_document_type(input: &str) -> Option<DocumentType> {
    let input_words = words(input);
    if input_words.is_empty() {
        return None;
    }

    let aliases: Vec<(Vec<String>, DocumentType)> = ALIASES
        .iter()
        .map(|(alias, doc_type)| (words(alias), *doc_type))
        .collect();

    aliases
        .iter()
        .find(|(alias, _)| contains_phrase(&input_words, alias))
        .or_else(|| {
            aliases
                .iter()
                .find(|(alias, _)| alias.iter().any(|word| input_words.contains(word)))
        })
        .map(|(_, doc_type)| *doc_type)
}
