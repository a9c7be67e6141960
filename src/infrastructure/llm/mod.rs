//! LLM backend implementations

mod factory;
mod gemini;
mod http_client;
mod openai;

pub use factory::{BackendConfig, BackendFactory, BackendKind};
pub use gemini::{GeminiProvider, GEMINI_BASE_URL};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiProvider, GROQ_BASE_URL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
