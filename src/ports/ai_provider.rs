//! AI Provider Port - the one seam to the hosted language model.
//!
//! Both the customer simulation and the supervisor evaluation go through
//! [`AIProvider::complete`]: a role-tagged history plus optional system
//! instruction and temperature in, one block of text out. Calls are
//! single-shot; there is no streaming and no retry at this layer.
//!
//! Role mapping used by the training handlers:
//!
//! | transcript speaker | [`MessageRole`] |
//! |---|---|
//! | agent (trainee) | `User` |
//! | customer (model persona) | `Assistant` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

/// Port for model completions.
///
/// Implementations translate [`CompletionRequest`] into the vendor wire
/// format and classify vendor failures into [`AIError`].
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Sends one request and waits for the full reply.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Vendor and model, for startup logs.
    fn provider_info(&self) -> ProviderInfo;
}

/// One model call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// History in transcript order.
    pub messages: Vec<Message>,
    /// Persona or role instruction, sent apart from the history.
    pub system_prompt: Option<String>,
    /// Sampling temperature; provider default when absent.
    pub temperature: Option<f32>,
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Empty request; the provider's sampling defaults apply until overridden.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            temperature: None,
            metadata,
        }
    }

    /// Appends one history entry.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Author of a history entry, from the model's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Human input (the trainee).
    User,
    /// Model output (the simulated customer).
    Assistant,
}

/// Correlates a model call with the training session that issued it.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub session_id: SessionId,
    /// Fresh UUID per call.
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(session_id: SessionId, trace_id: impl Into<String>) -> Self {
        Self {
            session_id,
            trace_id: trace_id.into(),
        }
    }
}

/// The model's answer to one call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Concatenated text; may be empty when the vendor blocked the prompt.
    pub content: String,
    /// Token usage.
    pub usage: TokenUsage,
    pub model: String,
    pub finish_reason: FinishReason,
}

/// Token counts, zero when the vendor omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Why generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    /// Output token limit reached.
    Length,
    /// Prompt or output blocked by vendor safety settings.
    ContentFilter,
    Other,
}

/// Vendor name and model identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Classified model call failures.
///
/// Surfaced to the trainee through the session's last error and the
/// `retryable` flag of the HTTP error body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// Quota exhausted (HTTP 429).
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u32,
    },

    /// Vendor-side failure (HTTP 5xx).
    #[error("provider unavailable: {message}")]
    Unavailable {
        message: String,
    },

    /// API key rejected (HTTP 401/403).
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Connection failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not decode.
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed request or unknown model (HTTP 400/404).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport timeout elapsed.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        timeout_secs: u32,
    },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn timeout(timeout_secs: u32) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// True when sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}
