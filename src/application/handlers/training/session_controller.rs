//! SessionController - owns the single training session and sequences model calls.
//!
//! State lives behind an async mutex that is never held across a provider
//! call: the busy phase is written, the lock is released, the call runs,
//! then the lock is re-taken to apply the completion. A completion whose
//! session was reset in the meantime is discarded.
//!
//! The outstanding call is tracked apart from the phase so that a reset
//! never frees the slot early: until the call returns, starting a new
//! session or issuing another call is refused as busy. Controller futures
//! must be driven to completion; the HTTP layer detaches them.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::domain::training::{
    PendingCall, ScenarioConfig, SessionError, SessionPhase, SessionState, Transcript, Turn,
};
use crate::ports::{AIError, AIProvider};

use super::{Evaluator, ResponseGenerator};

/// Errors returned by controller operations.
#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    /// The operation is not allowed right now.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The customer reply could not be generated.
    #[error("Customer reply failed: {0}")]
    Generation(#[source] AIError),

    /// The supervisor feedback could not be generated.
    #[error("Evaluation failed: {0}")]
    Evaluation(#[source] AIError),
}

/// Read-only view of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub session_id: Option<SessionId>,
    pub scenario: Option<ScenarioConfig>,
    pub transcript: Transcript,
    pub feedback: Option<String>,
    pub busy: bool,
    pub last_error: Option<String>,
}

/// Result of a successful reply request.
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub reply: Turn,
    pub snapshot: SessionSnapshot,
}

/// Result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub feedback: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Default)]
struct ControllerInner {
    state: SessionState,
    last_error: Option<String>,
    /// Session whose model call has not returned yet. Survives reset.
    in_flight: Option<SessionId>,
}

impl ControllerInner {
    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.in_flight {
            Some(_) => Err(SessionError::Busy {
                phase: self.state.phase(),
            }),
            None => Ok(()),
        }
    }

    fn issue(&mut self, next: SessionState, call: &PendingCall) {
        self.state = next;
        self.last_error = None;
        self.in_flight = Some(call.session_id);
    }

    fn snapshot(&self) -> SessionSnapshot {
        let session = self.state.session();
        SessionSnapshot {
            phase: self.state.phase(),
            session_id: session.map(|s| s.id()),
            scenario: session.map(|s| s.config().clone()),
            transcript: session.map(|s| s.transcript().clone()).unwrap_or_default(),
            feedback: self.state.feedback().map(str::to_string),
            busy: self.state.is_busy() || self.in_flight.is_some(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Coordinates the session state machine with the generator and evaluator.
pub struct SessionController {
    inner: Mutex<ControllerInner>,
    generator: ResponseGenerator,
    evaluator: Evaluator,
}

impl SessionController {
    /// Creates a controller in `Configuring` using one provider for both roles.
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self::with_components(
            ResponseGenerator::new(provider.clone()),
            Evaluator::new(provider),
        )
    }

    pub fn with_components(generator: ResponseGenerator, evaluator: Evaluator) -> Self {
        Self {
            inner: Mutex::new(ControllerInner::default()),
            generator,
            evaluator,
        }
    }

    /// Current state as a read-only view.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Starts a session for `config`, seeded with the customer's greeting.
    pub async fn start_session(
        &self,
        config: ScenarioConfig,
    ) -> Result<SessionSnapshot, ControllerError> {
        let mut inner = self.inner.lock().await;
        inner.ensure_idle()?;
        inner.state = inner.state.start(config)?;
        inner.last_error = None;

        if let Some(session) = inner.state.session() {
            tracing::info!(
                session_id = %session.id(),
                customer = %session.config().customer_name(),
                difficulty = %session.config().difficulty(),
                "Training session started"
            );
        }
        Ok(inner.snapshot())
    }

    /// Appends the agent's message and waits for the customer's reply.
    ///
    /// On provider failure the agent turn stays, the phase returns to
    /// `Active`, and the failure is recorded in `last_error`.
    pub async fn submit_agent_message(
        &self,
        text: impl Into<String>,
    ) -> Result<ReplyOutcome, ControllerError> {
        let call = {
            let mut inner = self.inner.lock().await;
            inner.ensure_idle()?;
            let (next, call) = inner.state.submit_agent_message(text)?;
            inner.issue(next, &call);
            call
        };

        self.finish_reply(call).await
    }

    /// Requests a reply again for an agent turn whose reply failed.
    pub async fn retry_reply(&self) -> Result<ReplyOutcome, ControllerError> {
        let call = {
            let mut inner = self.inner.lock().await;
            inner.ensure_idle()?;
            let (next, call) = inner.state.begin_retry()?;
            inner.issue(next, &call);
            call
        };

        tracing::debug!(session_id = %call.session_id, "Retrying customer reply");
        self.finish_reply(call).await
    }

    /// Ends the conversation and asks for supervisor feedback.
    ///
    /// On provider failure the phase returns to `Active` with the transcript
    /// unchanged so the trainee can try again.
    pub async fn end_session(&self) -> Result<EvaluationOutcome, ControllerError> {
        let call = {
            let mut inner = self.inner.lock().await;
            inner.ensure_idle()?;
            let (next, call) = inner.state.begin_evaluation()?;
            inner.issue(next, &call);
            call
        };

        let result = self.evaluator.evaluate(&call).await;

        let mut inner = self.inner.lock().await;
        inner.in_flight = None;
        match result {
            Ok(feedback) => {
                inner.state = self.applied(
                    inner.state.complete_evaluation(call.session_id, feedback.clone()),
                    call.session_id,
                )?;
                tracing::info!(session_id = %call.session_id, "Evaluation produced");
                Ok(EvaluationOutcome {
                    feedback,
                    snapshot: inner.snapshot(),
                })
            }
            Err(err) => {
                inner.state = self.applied(
                    inner.state.abandon_evaluation(call.session_id),
                    call.session_id,
                )?;
                tracing::error!(session_id = %call.session_id, error = %err, "Evaluation failed");
                let err = ControllerError::Evaluation(err);
                inner.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Discards everything and returns to `Configuring`. Idempotent.
    ///
    /// An outstanding call keeps the controller busy until it returns; its
    /// result is then discarded.
    pub async fn reset(&self) -> SessionSnapshot {
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.state.session() {
            tracing::info!(
                session_id = %session.id(),
                phase = %inner.state.phase(),
                "Training session reset"
            );
        }
        let in_flight = inner.in_flight;
        *inner = ControllerInner {
            in_flight,
            ..ControllerInner::default()
        };
        inner.snapshot()
    }

    async fn finish_reply(&self, call: PendingCall) -> Result<ReplyOutcome, ControllerError> {
        let result = self.generator.generate(&call).await;

        let mut inner = self.inner.lock().await;
        inner.in_flight = None;
        match result {
            Ok(reply) => {
                let next = self.applied(
                    inner.state.complete_reply(call.session_id, reply),
                    call.session_id,
                )?;
                let reply = next
                    .session()
                    .and_then(|s| s.transcript().last().cloned())
                    .ok_or_else(|| SessionError::superseded(call.session_id))?;
                inner.state = next;
                Ok(ReplyOutcome {
                    reply,
                    snapshot: inner.snapshot(),
                })
            }
            Err(err) => {
                inner.state = self.applied(
                    inner.state.abandon_reply(call.session_id),
                    call.session_id,
                )?;
                tracing::error!(session_id = %call.session_id, error = %err, "Customer reply failed");
                let err = ControllerError::Generation(err);
                inner.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Logs completions that arrived for a session that no longer exists.
    fn applied(
        &self,
        result: Result<SessionState, SessionError>,
        session_id: SessionId,
    ) -> Result<SessionState, SessionError> {
        if let Err(SessionError::Superseded { .. }) = &result {
            tracing::warn!(%session_id, "Discarding completion for superseded session");
        }
        result
    }
}
