//! Evaluator - grades a finished conversation as the training supervisor.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::training::{prompts, PendingCall};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Sends the whole transcript as a single supervisor prompt.
pub struct Evaluator {
    provider: Arc<dyn AIProvider>,
}

impl Evaluator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    /// Returns the feedback text.
    ///
    /// Empty model output becomes [`prompts::FEEDBACK_FALLBACK`].
    pub async fn evaluate(&self, call: &PendingCall) -> Result<String, AIError> {
        let metadata = RequestMetadata::new(call.session_id, Uuid::new_v4().to_string());
        let request = CompletionRequest::new(metadata).with_message(
            MessageRole::User,
            prompts::evaluation_prompt(&call.config, &call.transcript),
        );

        let response = self.provider.complete(request).await?;

        if response.content.is_empty() {
            tracing::warn!(session_id = %call.session_id, "Model returned no feedback text");
            return Ok(prompts::FEEDBACK_FALLBACK.to_string());
        }
        Ok(response.content)
    }
}
