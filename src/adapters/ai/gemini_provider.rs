//! Gemini Provider - Implementation of AIProvider for Google's Gemini API.
//!
//! Calls the `generateContent` REST endpoint. No streaming, no retries:
//! failures surface to the caller, which decides whether to try again.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-3-flash-preview")
//!     .with_timeout(Duration::from_secs(120));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! # Role alternation
//!
//! Gemini expects `user` and `model` turns to alternate. A failed reply
//! leaves two agent turns next to each other, so adjacent messages with the
//! same role are merged into one content entry before sending.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Default model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Default API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Retry delay assumed when a 429 carries no hint.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the Gemini provider.
#[derive(Debug)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Transport timeout for a single call.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::invalid_request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn timeout_secs(&self) -> u32 {
        self.config.timeout.as_secs() as u32
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let body = to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::timeout(self.timeout_secs())
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_body));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AIError::timeout(self.timeout_secs())
            } else {
                AIError::network(format!("Failed to read response: {}", e))
            }
        })?;

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Ok(from_gemini_response(gemini_response, &self.config.model))
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            model = %self.config.model,
            session_id = %request.metadata.session_id,
            trace_id = %request.metadata.trace_id,
            messages = request.messages.len(),
            "Sending generateContent request"
        );

        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

/// Maps a non-success status to an error.
fn classify_status(status: StatusCode, error_body: &str) -> AIError {
    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 | 404 => AIError::invalid_request(error_message(error_body)),
        500..=599 => AIError::unavailable(format!(
            "Server error {}: {}",
            status,
            error_message(error_body)
        )),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Pulls `error.message` out of a Google API error body, falling back to the raw body.
fn error_message(error_body: &str) -> String {
    serde_json::from_str::<GeminiErrorBody>(error_body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| error_body.to_string())
}

/// Reads the `RetryInfo.retryDelay` hint (e.g. `"17s"`) from a 429 body.
fn parse_retry_after(error_body: &str) -> u32 {
    let Ok(body) = serde_json::from_str::<GeminiErrorBody>(error_body) else {
        return DEFAULT_RETRY_AFTER_SECS;
    };

    body.error
        .details
        .iter()
        .filter_map(|d| d.retry_delay.as_deref())
        .find_map(|delay| {
            let secs = delay.trim().strip_suffix('s')?;
            secs.parse::<f64>().ok().map(|s| s.ceil() as u32)
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Converts our request to Gemini's format.
fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = Vec::new();

    for msg in &request.messages {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };

        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => {
                // Same speaker twice in a row: fold into the previous entry.
                if let Some(part) = last.parts.first_mut() {
                    part.text.push_str("\n\n");
                    part.text.push_str(&msg.content);
                }
            }
            _ => contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            }),
        }
    }

    GeminiRequest {
        contents,
        system_instruction: request.system_prompt.as_ref().map(|prompt| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: prompt.clone(),
            }],
        }),
        generation_config: request
            .temperature
            .map(|temperature| GenerationConfig { temperature }),
    }
}

/// Converts Gemini's response into ours. Missing candidates yield empty text.
fn from_gemini_response(response: GeminiResponse, requested_model: &str) -> CompletionResponse {
    let candidate = response.candidates.into_iter().next();

    let (content, finish_reason) = match candidate {
        Some(candidate) => {
            let text = candidate
                .content
                .map(|c| {
                    c.parts
                        .into_iter()
                        .filter_map(|p| p.text)
                        .collect::<Vec<_>>()
                        .join("")
                })
                .unwrap_or_default();
            let reason = match candidate.finish_reason.as_deref() {
                Some("STOP") | None => FinishReason::Stop,
                Some("MAX_TOKENS") => FinishReason::Length,
                Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST")
                | Some("PROHIBITED_CONTENT") => FinishReason::ContentFilter,
                Some(_) => FinishReason::Other,
            };
            (text, reason)
        }
        None => (String::new(), FinishReason::ContentFilter),
    };

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    CompletionResponse {
        content,
        usage,
        model: response
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        finish_reason,
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
    #[serde(default)]
    details: Vec<GeminiErrorInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiErrorInfo {
    retry_delay: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::RequestMetadata;

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), "trace-1"))
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-pro")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn config_debug_hides_api_key() {
        let config = GeminiConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn generate_url_includes_model() {
        let provider =
            GeminiProvider::new(GeminiConfig::new("k").with_base_url("https://example.test/"))
                .unwrap();
        assert_eq!(
            provider.generate_url(),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn provider_info_reports_model() {
        let provider = GeminiProvider::new(GeminiConfig::new("k")).unwrap();
        let info = provider.provider_info();
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, DEFAULT_GEMINI_MODEL);
    }

    mod request_conversion {
        use super::*;

        #[test]
        fn maps_roles_and_carries_settings() {
            let req = request()
                .with_system_prompt("Be Alex")
                .with_temperature(0.8)
                .with_message(MessageRole::Assistant, "Hello?")
                .with_message(MessageRole::User, "Hi Alex");

            let json = serde_json::to_value(to_gemini_request(&req)).unwrap();

            assert_eq!(json["contents"][0]["role"], "model");
            assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello?");
            assert_eq!(json["contents"][1]["role"], "user");
            assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be Alex");
            assert!(json["systemInstruction"].get("role").is_none());
            assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        }

        #[test]
        fn merges_adjacent_same_role_messages() {
            let req = request()
                .with_message(MessageRole::Assistant, "Hello?")
                .with_message(MessageRole::User, "Hi")
                .with_message(MessageRole::User, "Are you there?");

            let gemini = to_gemini_request(&req);

            assert_eq!(gemini.contents.len(), 2);
            assert_eq!(gemini.contents[1].parts[0].text, "Hi\n\nAre you there?");
        }

        #[test]
        fn omits_optional_fields_when_absent() {
            let req = request().with_message(MessageRole::User, "Evaluate this");
            let json = serde_json::to_value(to_gemini_request(&req)).unwrap();

            assert!(json.get("systemInstruction").is_none());
            assert!(json.get("generationConfig").is_none());
            assert_eq!(json["contents"].as_array().unwrap().len(), 1);
        }
    }

    mod response_conversion {
        use super::*;

        fn parse(body: &str) -> CompletionResponse {
            let response: GeminiResponse = serde_json::from_str(body).unwrap();
            from_gemini_response(response, "gemini-3-flash-preview")
        }

        #[test]
        fn joins_text_parts_of_first_candidate() {
            let resp = parse(
                r#"{
                    "candidates": [
                        {"content": {"role": "model", "parts": [{"text": "Who "}, {"text": "is this?"}]},
                         "finishReason": "STOP"},
                        {"content": {"parts": [{"text": "ignored"}]}}
                    ],
                    "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16},
                    "modelVersion": "gemini-3-flash-preview-001"
                }"#,
            );

            assert_eq!(resp.content, "Who is this?");
            assert_eq!(resp.finish_reason, FinishReason::Stop);
            assert_eq!(resp.usage.total_tokens, 16);
            assert_eq!(resp.model, "gemini-3-flash-preview-001");
        }

        #[test]
        fn missing_candidates_yield_empty_filtered_text() {
            let resp = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
            assert_eq!(resp.content, "");
            assert_eq!(resp.finish_reason, FinishReason::ContentFilter);
            assert_eq!(resp.model, "gemini-3-flash-preview");
            assert_eq!(resp.usage, TokenUsage::default());
        }

        #[test]
        fn maps_finish_reasons() {
            let resp = parse(r#"{"candidates": [{"content": {"parts": [{"text": "a"}]}, "finishReason": "MAX_TOKENS"}]}"#);
            assert_eq!(resp.finish_reason, FinishReason::Length);

            let resp = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
            assert_eq!(resp.finish_reason, FinishReason::ContentFilter);
            assert_eq!(resp.content, "");
        }
    }

    mod status_mapping {
        use super::*;

        #[test]
        fn auth_failures() {
            assert_eq!(
                classify_status(StatusCode::UNAUTHORIZED, ""),
                AIError::AuthenticationFailed
            );
            assert_eq!(
                classify_status(StatusCode::FORBIDDEN, ""),
                AIError::AuthenticationFailed
            );
        }

        #[test]
        fn rate_limit_reads_retry_delay() {
            let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "details": [
                {"@type": "type.googleapis.com/google.rpc.QuotaFailure"},
                {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "17s"}
            ]}}"#;
            assert_eq!(
                classify_status(StatusCode::TOO_MANY_REQUESTS, body),
                AIError::rate_limited(17)
            );
        }

        #[test]
        fn rate_limit_defaults_without_hint() {
            assert_eq!(
                classify_status(StatusCode::TOO_MANY_REQUESTS, "not json"),
                AIError::rate_limited(DEFAULT_RETRY_AFTER_SECS)
            );
        }

        #[test]
        fn bad_request_uses_error_message() {
            let body = r#"{"error": {"code": 400, "message": "Invalid model"}}"#;
            assert_eq!(
                classify_status(StatusCode::BAD_REQUEST, body),
                AIError::invalid_request("Invalid model")
            );
            assert!(matches!(
                classify_status(StatusCode::NOT_FOUND, "missing"),
                AIError::InvalidRequest(_)
            ));
        }

        #[test]
        fn server_errors_are_unavailable() {
            let err = classify_status(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
            assert!(matches!(err, AIError::Unavailable { .. }));
            assert!(err.is_retryable());
        }
    }
}
