use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage,
};

/// Groq serves the OpenAI chat completions API under this prefix
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";

/// Provider for any OpenAI-compatible chat completions API (Groq by default)
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, GROQ_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> = request
            .messages
            .iter()
            .map(OpenAiMessage::from_domain)
            .collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.provider_name(), format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.provider_name(), "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response = llm_response.with_usage(Usage::new(
                usage.prompt_tokens,
                usage.completion_tokens,
            ));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::provider(self.provider_name(), e.to_string()))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai_compatible"
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content_text().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "llama3-70b-8192",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
        })
    }

    #[tokio::test]
    async fn test_groq_chat() {
        let client = MockHttpClient::new().with_response(GROQ_URL, completion("void contract, voidable contract"));
        let provider = OpenAiProvider::new(client, "gsk-test");

        let request = LlmRequest::builder()
            .system("You are a legal research assistant.")
            .user("Extract keywords")
            .temperature(0.1)
            .max_tokens(2000)
            .build();

        let response = provider.chat("llama3-70b-8192", request).await.unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), "void contract, voidable contract");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().completion_tokens, 7);
    }

    #[tokio::test]
    async fn test_request_body_and_headers() {
        let client = MockHttpClient::new().with_response(GROQ_URL, completion("ok"));
        let provider = OpenAiProvider::new(client, "gsk-test");

        let request = LlmRequest::builder()
            .system("Be brief.")
            .user("Hello")
            .temperature(0.3)
            .max_tokens(500)
            .build();
        provider.chat("llama3-70b-8192", request).await.unwrap();

        let recorded = provider.client.requests();
        assert_eq!(recorded.len(), 1);

        let body = recorded[0].body.as_ref().unwrap();
        assert_eq!(body["model"], "llama3-70b-8192");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert_eq!(body["max_tokens"], 500);
        assert!(recorded[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer gsk-test".to_string())));
    }

    #[tokio::test]
    async fn test_error_is_attributed_to_provider() {
        let client = MockHttpClient::new().with_error(GROQ_URL, "HTTP 401: invalid api key");
        let provider = OpenAiProvider::new(client, "bad-key");

        let err = provider
            .chat("llama3-70b-8192", LlmRequest::builder().user("Hello").build())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Provider { ref provider, .. } if provider == "openai_compatible"));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(custom_url, completion("Custom response"));
        let provider = OpenAiProvider::with_base_url(client, "test-key", "http://localhost:8080/");

        let response = provider
            .chat("local-model", LlmRequest::builder().user("Test").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "Custom response");
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let client = MockHttpClient::new().with_response(
            GROQ_URL,
            serde_json::json!({ "id": "x", "model": "m", "choices": [] }),
        );
        let provider = OpenAiProvider::new(client, "k");

        let err = provider
            .chat("m", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }
}
