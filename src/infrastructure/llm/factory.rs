use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::http_client::HttpClient;
use super::{GeminiProvider, OpenAiProvider, GEMINI_BASE_URL, GROQ_BASE_URL};
use crate::domain::{Backend, BackendPool, DomainError, LlmProvider};

/// Wire protocol spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    OpenaiCompatible,
    Gemini,
}

/// Configuration of one text-generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    pub kind: BackendKind,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl BackendConfig {
    pub fn groq() -> Self {
        Self {
            name: "groq".to_string(),
            kind: BackendKind::OpenaiCompatible,
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "llama3-70b-8192".to_string(),
            base_url: Some(GROQ_BASE_URL.to_string()),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn gemini() -> Self {
        Self {
            name: "gemini".to_string(),
            kind: BackendKind::Gemini,
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: Some(GEMINI_BASE_URL.to_string()),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Default pool: Groq first, Gemini as fallback
    pub fn defaults() -> Vec<Self> {
        vec![Self::groq(), Self::gemini()]
    }
}

/// Factory for creating backends from configuration
#[derive(Debug)]
pub struct BackendFactory;

impl BackendFactory {
    /// Create one backend, resolving its API key through `lookup_key`.
    ///
    /// A missing or blank key is an initialization failure.
    pub fn create<F>(config: &BackendConfig, lookup_key: F) -> Result<Backend, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup_key(&config.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "{} is not set for backend '{}'",
                    config.api_key_env, config.name
                ))
            })?;

        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let provider: Arc<dyn LlmProvider> = match (config.kind, config.base_url.as_deref()) {
            (BackendKind::OpenaiCompatible, Some(base_url)) => {
                Arc::new(OpenAiProvider::with_base_url(http_client, api_key, base_url))
            }
            (BackendKind::OpenaiCompatible, None) => Arc::new(OpenAiProvider::new(http_client, api_key)),
            (BackendKind::Gemini, Some(base_url)) => {
                Arc::new(GeminiProvider::with_base_url(http_client, api_key, base_url))
            }
            (BackendKind::Gemini, None) => Arc::new(GeminiProvider::new(http_client, api_key)),
        };

        Ok(Backend::new(provider, config.model.clone()))
    }

    /// Build a pool in configuration order; failed backends are left out
    pub fn build_pool<F>(configs: &[BackendConfig], lookup_key: F) -> BackendPool
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut pool = BackendPool::new();
        for config in configs {
            pool.register(config.name.clone(), Self::create(config, &lookup_key));
        }
        pool
    }

    /// Build a pool reading API keys from the process environment
    pub fn build_pool_from_env(configs: &[BackendConfig]) -> BackendPool {
        Self::build_pool(configs, |name| std::env::var(name).ok())
    }
}
