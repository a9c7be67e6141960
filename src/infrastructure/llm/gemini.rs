use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent` provider
#[derive(Debug)]
pub struct GeminiProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn build_request(&self, request: &LlmRequest) -> serde_json::Value {
        // System messages travel separately as systemInstruction
        let contents: Vec<GeminiContent> = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(GeminiContent::from_domain)
            .collect();

        let mut body = serde_json::json!({ "contents": contents });

        if let Some(system) = request.system_text() {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, model: &str, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("gemini", "No candidates in response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let mut llm_response = LlmResponse::new(
            response.response_id.unwrap_or_default(),
            response.model_version.unwrap_or_else(|| model.to_string()),
            Message::assistant(text),
        );

        if let Some(reason) = candidate.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage_metadata {
            llm_response = llm_response.with_usage(Usage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for GeminiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.generate_url(model);
        let body = self.build_request(&request);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::provider("gemini", e.to_string()))?;

        self.parse_response(model, response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
        "OTHER" => FinishReason::Error,
        _ => FinishReason::Stop,
    }
}

// Gemini API types

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "model",
            _ => "user",
        };

        Self {
            role: Some(role.to_string()),
            parts: vec![GeminiPart {
                text: Some(message.content_text().to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const GEMINI_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

    fn generated(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 30, "totalTokenCount": 42 },
            "modelVersion": "gemini-2.5-flash",
            "responseId": "resp-1"
        })
    }

    #[tokio::test]
    async fn test_gemini_chat() {
        let client = MockHttpClient::new().with_response(GEMINI_URL, generated("A void contract has no legal effect."));
        let provider = GeminiProvider::new(client, "AIza-test");

        let response = provider
            .chat("gemini-2.5-flash", LlmRequest::builder().user("Explain void contracts").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "A void contract has no legal effect.");
        assert_eq!(response.id, "resp-1");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 42);
    }

    #[tokio::test]
    async fn test_request_body() {
        let client = MockHttpClient::new().with_response(GEMINI_URL, generated("ok"));
        let provider = GeminiProvider::new(client, "AIza-test");

        let request = LlmRequest::builder()
            .system("Answer only from the context.")
            .user("What is the rent?")
            .temperature(0.3)
            .max_tokens(500)
            .build();
        provider.chat("gemini-2.5-flash", request).await.unwrap();

        let recorded = provider.client.requests();
        let body = recorded[0].body.as_ref().unwrap();

        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "What is the rent?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Answer only from the context.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 500);
        assert!(recorded[0]
            .headers
            .contains(&("x-goog-api-key".to_string(), "AIza-test".to_string())));
    }

    #[tokio::test]
    async fn test_multi_part_text_is_joined() {
        let client = MockHttpClient::new().with_response(
            GEMINI_URL,
            serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Part one. " }, { "text": "Part two." }] },
                    "finishReason": "MAX_TOKENS"
                }]
            }),
        );
        let provider = GeminiProvider::new(client, "k");

        let response = provider
            .chat("gemini-2.5-flash", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "Part one. Part two.");
        assert_eq!(response.finish_reason, Some(FinishReason::Length));
        assert_eq!(response.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let client = MockHttpClient::new().with_response(
            GEMINI_URL,
            serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
        );
        let provider = GeminiProvider::new(client, "k");

        let err = provider
            .chat("gemini-2.5-flash", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::provider("gemini", "No candidates in response"));
    }

    #[tokio::test]
    async fn test_http_error() {
        let client = MockHttpClient::new().with_error(GEMINI_URL, "HTTP 429: quota exceeded");
        let provider = GeminiProvider::new(client, "k");

        let err = provider
            .chat("gemini-2.5-flash", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
    }
}
