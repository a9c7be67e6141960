use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{ChunkingConfig, GenerationSettings, ValidationPolicy};
use crate::infrastructure::llm::BackendConfig;
use crate::infrastructure::search::DUCKDUCKGO_HTML_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    /// Registration order is the fallback order
    pub backends: Vec<BackendConfig>,
    pub drafting: DraftingConfig,
    pub clarification: ClarificationConfig,
    pub document_qa: DocumentQaConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    pub sessions_dir: PathBuf,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClarificationConfig {
    /// Domains the web search is restricted to
    pub sites: Vec<String>,
    pub max_results: usize,
    pub min_results: usize,
    pub max_errors: u32,
    pub max_keywords: usize,
    /// Cleaned snippets at or below this length are dropped before summarising
    pub min_snippet_length: usize,
    /// Longer content is chunked and only the first chunks are summarised
    pub max_content_length: usize,
    pub content_chunk_size: usize,
    pub content_chunk_overlap: usize,
    pub max_content_chunks: usize,
    pub min_summary_length: usize,
    pub max_citations: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentQaConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embedding_dimensions: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("data/sessions"),
            temperature: 0.1,
            max_tokens: 4000,
        }
    }
}

impl DraftingConfig {
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings::new(self.temperature, self.max_tokens)
    }
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            sites: vec!["canlii.org".to_string(), "justice.gc.ca".to_string()],
            max_results: 5,
            min_results: 2,
            max_errors: 2,
            max_keywords: 5,
            min_snippet_length: 100,
            max_content_length: 8000,
            content_chunk_size: 2000,
            content_chunk_overlap: 200,
            max_content_chunks: 3,
            min_summary_length: 50,
            max_citations: 10,
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

impl ClarificationConfig {
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings::new(self.temperature, self.max_tokens)
    }

    pub fn validation(&self) -> ValidationPolicy {
        ValidationPolicy::new(self.min_results, self.max_errors)
    }

    pub fn content_chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.content_chunk_size, self.content_chunk_overlap)
    }
}

impl Default for DocumentQaConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            embedding_dimensions: 384,
            temperature: 0.3,
            max_tokens: 500,
        }
    }
}

impl DocumentQaConfig {
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings::new(self.temperature, self.max_tokens)
    }

    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.chunk_overlap)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Backends to register, falling back to the built-in pair when none are configured
    pub fn backends(&self) -> Vec<BackendConfig> {
        if self.backends.is_empty() {
            BackendConfig::defaults()
        } else {
            self.backends.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.drafting.sessions_dir, PathBuf::from("data/sessions"));
        assert_eq!(config.clarification.validation(), ValidationPolicy::new(2, 2));
        assert_eq!(config.clarification.content_chunking(), ChunkingConfig::new(2000, 200));
        assert_eq!(config.document_qa.chunking(), ChunkingConfig::default());
        assert_eq!(config.search.endpoint, DUCKDUCKGO_HTML_URL);
    }

    #[test]
    fn test_default_backends_are_groq_then_gemini() {
        let names: Vec<String> = AppConfig::default().backends().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["groq", "gemini"]);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "logging": { "format": "json" },
            "clarification": { "min_results": 3 },
            "backends": [{
                "name": "local",
                "kind": "openai_compatible",
                "api_key_env": "LOCAL_KEY",
                "model": "llama3",
                "base_url": "http://localhost:8000"
            }]
        }))
        .unwrap();

        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.clarification.min_results, 3);
        assert_eq!(config.clarification.max_errors, 2);
        assert_eq!(config.backends()[0].name, "local");
        assert_eq!(config.backends().len(), 1);
    }
}
