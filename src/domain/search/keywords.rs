/// Legal terms recognised when no backend can extract keywords
const LEGAL_TERMS: &[&str] = &[
    "contract",
    "void",
    "voidable",
    "tort",
    "negligence",
    "liability",
    "statute",
    "common law",
    "civil",
    "criminal",
    "constitutional",
    "administrative",
    "property",
    "family",
];

const JURISDICTION_TERM: &str = "Canada";

/// Split a comma-separated backend reply into at most `max` keywords
pub fn parse_keywords(text: &str, max: usize) -> Vec<String> {
    text.split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Deterministic keyword extraction used when every backend fails.
///
/// Always returns something to search with.
pub fn fallback_keywords(query: &str, max: usize) -> Vec<String> {
    let query_lower = query.to_lowercase();

    let mut found: Vec<String> = LEGAL_TERMS
        .iter()
        .filter(|term| query_lower.contains(*term))
        .map(|term| term.to_string())
        .collect();

    if !query_lower.contains("canada") && !query_lower.contains("canadian") {
        found.push(JURISDICTION_TERM.to_string());
    }

    if found.is_empty() {
        return vec!["legal".to_string(), "law".to_string(), JURISDICTION_TERM.to_string()];
    }

    found.truncate(max);
    found
}

/// Keywords joined by spaces followed by a `site:` filter per domain
pub fn build_search_query(keywords: &[String], sites: &[String]) -> String {
    let filter = sites
        .iter()
        .map(|site| format!("site:{}", site))
        .collect::<Vec<_>>()
        .join(" OR ");

    match (keywords.is_empty(), filter.is_empty()) {
        (_, true) => keywords.join(" "),
        (true, false) => filter,
        (false, false) => format!("{} {}", keywords.join(" "), filter),
    }
}
