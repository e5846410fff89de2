//! Google Gemini `generateContent` client

use std::{env, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};

use super::{ChatError, LanguageModel, classify_failure};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API root including the version segment
    pub base_url: String,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create a new GeminiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GEMINI_API_KEY`: API key (required)
    /// - `GEMINI_MODEL`: Model name (default: "gemini-2.0-flash")
    /// - `GEMINI_BASE_URL`: API root (default: Google's v1beta endpoint)
    /// - `UPSTREAM_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .context("GEMINI_API_KEY environment variable not set")?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Gemini backed [`LanguageModel`]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key =
            HeaderValue::from_str(&config.api_key).context("GEMINI_API_KEY is not a valid header value")?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ChatError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Upstream("Gemini request timed out".to_string())
                } else {
                    classify_failure(e.status(), &e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".into());
            return Err(classify_failure(
                Some(status),
                &format!("Gemini returned {}: {}", status.as_u16(), body),
            ));
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ChatError::Upstream(format!("Gemini response decode: {e}")))?;

        payload.into_text()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 2048,
                temperature: 0.7,
                top_p: 0.9,
                top_k: 40,
            },
        }
    }
}

#[derive(Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<Option<String>, ChatError> {
        if self
            .prompt_feedback
            .as_ref()
            .is_some_and(|feedback| feedback.block_reason.is_some())
        {
            return Err(ChatError::ContentBlocked);
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(None);
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            if candidate.finish_reason.as_deref() == Some("SAFETY") {
                return Err(ChatError::ContentBlocked);
            }
            return Ok(None);
        }

        Ok(Some(text))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GeminiClient {
        let mut config = GeminiConfig::new("test-key");
        config.model = "test-model".to_string();
        config.base_url = server.uri();
        GeminiClient::new(config).unwrap()
    }

    async fn mount(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"maxOutputTokens": 2048, "topK": 40}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there!"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(
            client.generate("hi").await.unwrap(),
            Some("Hello there!".to_string())
        );
        assert_eq!(client.model_name(), "test-model");
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}
            })),
        )
        .await;

        let client = client_for(&server).await;
        assert_eq!(client.generate("hi").await.unwrap_err(), ChatError::RateLimited);
    }

    #[tokio::test]
    async fn test_invalid_key_is_unauthorized() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT", "details": [{"reason": "API_KEY_INVALID"}]}
            })),
        )
        .await;

        let client = client_for(&server).await;
        assert_eq!(client.generate("hi").await.unwrap_err(), ChatError::Unauthorized);
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

        let client = client_for(&server).await;
        match client.generate("hi").await.unwrap_err() {
            ChatError::Upstream(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })),
        )
        .await;

        let client = client_for(&server).await;
        assert_eq!(client.generate("hi").await.unwrap_err(), ChatError::ContentBlocked);
    }

    #[tokio::test]
    async fn test_safety_finish_without_text_is_blocked() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })),
        )
        .await;

        let client = client_for(&server).await;
        assert_eq!(client.generate("hi").await.unwrap_err(), ChatError::ContentBlocked);
    }

    #[tokio::test]
    async fn test_empty_completion_is_none() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"candidates": []})),
        )
        .await;

        let client = client_for(&server).await;
        assert_eq!(client.generate("hi").await.unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
        }
        assert!(GeminiConfig::from_env().is_err());

        unsafe {
            std::env::set_var("GEMINI_API_KEY", "k");
            std::env::remove_var("GEMINI_MODEL");
            std::env::remove_var("GEMINI_BASE_URL");
            std::env::remove_var("UPSTREAM_TIMEOUT_SECS");
        }
        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
        }
    }
}
