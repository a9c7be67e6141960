//! Web search implementations

mod duckduckgo;

pub use duckduckgo::{DuckDuckGoSearch, DUCKDUCKGO_HTML_URL};
