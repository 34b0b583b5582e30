//! Gemini service for Google Gemini API interactions
//!
//! Implements the outbound generation call over the `generateContent` REST
//! endpoint. Key selection and failover live in the generation service; this
//! client only performs a single call with the credential it is handed and
//! classifies the failure.

use crate::schemas::gemini::{models, GeminiError, GeminiRequest, GeminiResponse};
use crate::services::backend_pool::ApiKeyCredential;
use crate::services::generation::{ExternalCallError, FailureReason, GenerationBackend};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini Client
// ============================================================================

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model name (default: gemini-1.5-flash)
    pub model: String,

    /// Base URL (default: generativelanguage.googleapis.com)
    pub base_url: Option<String>,

    /// Request timeout in seconds, 0 for none
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: models::GEMINI_1_5_FLASH.to_string(),
            base_url: None,
            timeout_seconds: 0,
        }
    }
}

impl GeminiConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// HTTP client for the Gemini generateContent API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder.build()?;

        tracing::info!(
            model = %config.model,
            base_url = %config.base_url.as_deref().unwrap_or(GEMINI_API_BASE),
            "Initialized Gemini client"
        );

        Ok(Self { client, config })
    }

    /// Get the base URL
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/')
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Call generateContent with `prompt` and return the first candidate's text
    pub async fn generate_content(
        &self,
        credential: &ApiKeyCredential,
        prompt: &str,
    ) -> Result<String, ExternalCallError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url(),
            self.config.model
        );

        tracing::debug!(
            model = %self.config.model,
            url = %url,
            credential = %credential.name(),
            "Calling Gemini generateContent API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.api_key())
            .json(&GeminiRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                ExternalCallError::new(FailureReason::Network, format!("HTTP request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ExternalCallError::new(FailureReason::Network, format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini response");
            ExternalCallError::new(
                FailureReason::MalformedResponse,
                format!("Failed to parse response: {}", e),
            )
        })?;

        match parsed.first_text() {
            Some(text) => Ok(text),
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                Err(ExternalCallError::new(
                    FailureReason::MalformedResponse,
                    format!("Empty response from Gemini: {}", reason),
                ))
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        credential: &ApiKeyCredential,
        prompt: &str,
    ) -> Result<String, ExternalCallError> {
        self.generate_content(credential, prompt).await
    }
}

/// Map a non-success HTTP answer to an external failure
fn classify_error(status: StatusCode, body: &str) -> ExternalCallError {
    let (code, message, api_status) = match serde_json::from_str::<GeminiError>(body) {
        Ok(err) => (err.error.code, err.error.message, err.error.status),
        Err(_) => (status.as_u16() as i32, body.to_string(), String::new()),
    };

    let reason = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureReason::Authentication,
        StatusCode::TOO_MANY_REQUESTS => FailureReason::Quota,
        // Gemini answers an invalid key with 400 INVALID_ARGUMENT
        StatusCode::BAD_REQUEST if message.contains("API key") => FailureReason::Authentication,
        _ if api_status == "RESOURCE_EXHAUSTED" => FailureReason::Quota,
        _ => FailureReason::Upstream,
    };

    ExternalCallError::new(reason, format!("API error: {} - {}", code, message))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    async fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(GeminiConfig::default().with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::default()
            .with_model("gemini-2.0-flash")
            .with_timeout(30);

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.base_url.is_none());
        assert_eq!(GeminiConfig::default().model, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "## Answer"}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("key-1", "gemini_key_1");

        let text = client.generate(&cred, "Explain").await.unwrap();

        assert_eq!(text, "## Answer");
    }

    #[tokio::test]
    async fn test_quota_error_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("key-1", "gemini_key_1");

        let err = client.generate(&cred, "Explain").await.unwrap_err();

        assert_eq!(err.reason, FailureReason::Quota);
        assert_eq!(err.message, "API error: 429 - Resource has been exhausted");
    }

    #[tokio::test]
    async fn test_invalid_key_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("bad", "gemini_key_1");

        let err = client.generate(&cred, "Explain").await.unwrap_err();

        assert_eq!(err.reason, FailureReason::Authentication);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("key-1", "gemini_key_1");

        let err = client.generate(&cred, "Explain").await.unwrap_err();

        assert_eq!(err.reason, FailureReason::MalformedResponse);
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("key-1", "gemini_key_1");

        let err = client.generate(&cred, "Explain").await.unwrap_err();

        assert_eq!(err.reason, FailureReason::MalformedResponse);
        assert!(err.message.contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_server_error_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cred = ApiKeyCredential::new("key-1", "gemini_key_1");

        let err = client.generate(&cred, "Explain").await.unwrap_err();

        assert_eq!(err.reason, FailureReason::Upstream);
        assert_eq!(err.message, "API error: 503 - overloaded");
    }
}
