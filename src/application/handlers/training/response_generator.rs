//! ResponseGenerator - produces the simulated customer's next reply.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::training::{prompts, PendingCall, Speaker};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Builds the persona prompt and asks the model for the customer's reply.
pub struct ResponseGenerator {
    provider: Arc<dyn AIProvider>,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    /// Returns the customer's reply text.
    ///
    /// Empty model output becomes [`prompts::REPLY_FALLBACK`]. Provider
    /// failures are returned unchanged.
    pub async fn generate(&self, call: &PendingCall) -> Result<String, AIError> {
        let request = build_request(call);
        let response = self.provider.complete(request).await?;

        if response.content.is_empty() {
            tracing::warn!(
                session_id = %call.session_id,
                finish_reason = ?response.finish_reason,
                "Model returned no reply text, using fallback"
            );
            return Ok(prompts::REPLY_FALLBACK.to_string());
        }

        tracing::debug!(
            session_id = %call.session_id,
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Customer reply generated"
        );
        Ok(response.content)
    }
}

fn build_request(call: &PendingCall) -> CompletionRequest {
    let metadata = RequestMetadata::new(call.session_id, Uuid::new_v4().to_string());

    call.transcript.turns().iter().fold(
        CompletionRequest::new(metadata)
            .with_system_prompt(prompts::persona_instruction(&call.config))
            .with_temperature(prompts::CUSTOMER_TEMPERATURE),
        |request, turn| {
            let role = match turn.speaker() {
                Speaker::Agent => MessageRole::User,
                Speaker::Customer => MessageRole::Assistant,
            };
            request.with_message(role, turn.text())
        },
    )
}
