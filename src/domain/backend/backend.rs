use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, LlmProvider, LlmRequest};

/// Sampling settings a workflow applies to every prompt it sends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

impl GenerationSettings {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }

    /// Build a single-turn request with an optional system instruction
    pub fn request(&self, system: Option<&str>, user: impl Into<String>) -> LlmRequest {
        let mut builder = LlmRequest::builder();

        if let Some(system) = system {
            builder = builder.system(system);
        }

        builder
            .user(user)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
    }
}

/// A provider bound to the model it should be called with
#[derive(Debug, Clone)]
pub struct Backend {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl Backend {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a request and return the trimmed generated text
    pub async fn generate(&self, request: LlmRequest) -> Result<String, DomainError> {
        let response = self.provider.chat(&self.model, request).await?;
        Ok(response.content().trim().to_string())
    }
}
