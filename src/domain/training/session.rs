//! Training session lifecycle.
//!
//! `SessionState` is a sum type with exactly one phase at a time. Every
//! operation takes the current state by reference and yields a replacement;
//! nothing is mutated in place. Operations that need a model call also
//! return a [`PendingCall`] snapshot of the inputs for that call.
//!
//! ```text
//! Configuring ──start──▶ Active ──submit/retry──▶ AwaitingReply ──reply──▶ Active
//!                          │                          └──failure──▶ Active
//!                          └──end──▶ AwaitingEvaluation ──feedback──▶ Evaluated
//!                                          └──failure──▶ Active
//! any phase ──reset──▶ Configuring
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{SessionId, StateMachine, Timestamp, ValidationError};

use super::{prompts, ScenarioConfig, SessionError, Transcript, Turn};

/// Discriminant of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Configuring,
    Active,
    AwaitingReply,
    AwaitingEvaluation,
    Evaluated,
}

impl SessionPhase {
    /// True while a model call is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionPhase::AwaitingReply | SessionPhase::AwaitingEvaluation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Configuring => "configuring",
            SessionPhase::Active => "active",
            SessionPhase::AwaitingReply => "awaiting_reply",
            SessionPhase::AwaitingEvaluation => "awaiting_evaluation",
            SessionPhase::Evaluated => "evaluated",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SessionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionPhase::*;
        matches!(
            (self, target),
            (Configuring, Active)
                | (Active, AwaitingReply)
                | (Active, AwaitingEvaluation)
                | (Active, Configuring)
                | (AwaitingReply, Active)
                | (AwaitingReply, Configuring)
                | (AwaitingEvaluation, Active)
                | (AwaitingEvaluation, Evaluated)
                | (AwaitingEvaluation, Configuring)
                | (Evaluated, Configuring)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionPhase::*;
        match self {
            Configuring => vec![Active],
            Active => vec![AwaitingReply, AwaitingEvaluation, Configuring],
            AwaitingReply => vec![Active, Configuring],
            AwaitingEvaluation => vec![Active, Evaluated, Configuring],
            Evaluated => vec![Configuring],
        }
    }
}

/// A started session: its scenario and the conversation so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSession {
    id: SessionId,
    config: ScenarioConfig,
    transcript: Transcript,
    started_at: Timestamp,
}

impl ActiveSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    fn with_transcript(&self, transcript: Transcript) -> Self {
        Self {
            transcript,
            ..self.clone()
        }
    }
}

/// A finished session with the supervisor's feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedSession {
    session: ActiveSession,
    feedback: String,
    evaluated_at: Timestamp,
}

impl EvaluatedSession {
    pub fn session(&self) -> &ActiveSession {
        &self.session
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn evaluated_at(&self) -> &Timestamp {
        &self.evaluated_at
    }
}

/// Inputs captured for a model call issued by a busy transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCall {
    pub session_id: SessionId,
    pub config: ScenarioConfig,
    pub transcript: Transcript,
}

impl PendingCall {
    fn from_session(session: &ActiveSession) -> Self {
        Self {
            session_id: session.id,
            config: session.config.clone(),
            transcript: session.transcript.clone(),
        }
    }
}

/// The controller's whole state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Configuring,
    Active(ActiveSession),
    AwaitingReply(ActiveSession),
    AwaitingEvaluation(ActiveSession),
    Evaluated(EvaluatedSession),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Configuring => SessionPhase::Configuring,
            SessionState::Active(_) => SessionPhase::Active,
            SessionState::AwaitingReply(_) => SessionPhase::AwaitingReply,
            SessionState::AwaitingEvaluation(_) => SessionPhase::AwaitingEvaluation,
            SessionState::Evaluated(_) => SessionPhase::Evaluated,
        }
    }

    /// The running or finished session, if any.
    pub fn session(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Configuring => None,
            SessionState::Active(s)
            | SessionState::AwaitingReply(s)
            | SessionState::AwaitingEvaluation(s) => Some(s),
            SessionState::Evaluated(e) => Some(&e.session),
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        match self {
            SessionState::Evaluated(e) => Some(&e.feedback),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Starts a session seeded with the customer's greeting.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is outstanding
    /// - `InvalidTransition` outside `Configuring`
    pub fn start(&self, config: ScenarioConfig) -> Result<SessionState, SessionError> {
        self.guard("start a session", SessionPhase::Active)?;

        let transcript = Transcript::seeded(prompts::greeting(config.customer_name()));
        Ok(SessionState::Active(ActiveSession {
            id: SessionId::new(),
            config,
            transcript,
            started_at: Timestamp::now(),
        }))
    }

    /// Appends the agent's message and moves to `AwaitingReply`.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is outstanding
    /// - `InvalidTransition` outside `Active`
    /// - `Validation` for blank text
    pub fn submit_agent_message(
        &self,
        text: impl Into<String>,
    ) -> Result<(SessionState, PendingCall), SessionError> {
        let session = self.active_for("send a message", SessionPhase::AwaitingReply)?;
        let turn = Turn::agent(text)?;

        let next = session.with_transcript(session.transcript.appended(turn));
        let call = PendingCall::from_session(&next);
        Ok((SessionState::AwaitingReply(next), call))
    }

    /// Re-requests a reply for an agent turn whose reply failed.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is outstanding
    /// - `InvalidTransition` outside `Active`
    /// - `NothingToRetry` when the last turn is not an agent turn
    pub fn begin_retry(&self) -> Result<(SessionState, PendingCall), SessionError> {
        let session = self.active_for("retry a reply", SessionPhase::AwaitingReply)?;
        if !session.transcript.awaits_customer() {
            return Err(SessionError::NothingToRetry);
        }

        let call = PendingCall::from_session(session);
        Ok((SessionState::AwaitingReply(session.clone()), call))
    }

    /// Applies a generated reply.
    ///
    /// # Errors
    ///
    /// - `Superseded` when the session was reset or replaced meanwhile
    pub fn complete_reply(
        &self,
        session_id: SessionId,
        reply: impl Into<String>,
    ) -> Result<SessionState, SessionError> {
        let session = self.awaiting_reply(session_id)?;
        let transcript = session.transcript.appended(Turn::customer(reply));
        Ok(SessionState::Active(session.with_transcript(transcript)))
    }

    /// Returns to `Active` after a failed reply, transcript unchanged.
    pub fn abandon_reply(&self, session_id: SessionId) -> Result<SessionState, SessionError> {
        let session = self.awaiting_reply(session_id)?;
        Ok(SessionState::Active(session.clone()))
    }

    /// Moves to `AwaitingEvaluation`.
    ///
    /// # Errors
    ///
    /// - `Busy` while a call is outstanding
    /// - `InvalidTransition` outside `Active`
    /// - `Validation` for an empty transcript
    pub fn begin_evaluation(&self) -> Result<(SessionState, PendingCall), SessionError> {
        let session = self.active_for("end the session", SessionPhase::AwaitingEvaluation)?;
        if session.transcript.is_empty() {
            return Err(ValidationError::empty_field("transcript").into());
        }

        let call = PendingCall::from_session(session);
        Ok((SessionState::AwaitingEvaluation(session.clone()), call))
    }

    /// Stores feedback and moves to `Evaluated`.
    pub fn complete_evaluation(
        &self,
        session_id: SessionId,
        feedback: impl Into<String>,
    ) -> Result<SessionState, SessionError> {
        let session = self.awaiting_evaluation(session_id)?;
        Ok(SessionState::Evaluated(EvaluatedSession {
            session: session.clone(),
            feedback: feedback.into(),
            evaluated_at: Timestamp::now(),
        }))
    }

    /// Returns to `Active` after a failed evaluation, transcript unchanged.
    pub fn abandon_evaluation(&self, session_id: SessionId) -> Result<SessionState, SessionError> {
        let session = self.awaiting_evaluation(session_id)?;
        Ok(SessionState::Active(session.clone()))
    }

    fn guard(&self, operation: &'static str, target: SessionPhase) -> Result<(), SessionError> {
        let phase = self.phase();
        if phase.is_busy() {
            return Err(SessionError::Busy { phase });
        }
        phase
            .transition_to(target)
            .map(|_| ())
            .map_err(|_| SessionError::invalid_transition(operation, phase))
    }

    fn active_for(
        &self,
        operation: &'static str,
        target: SessionPhase,
    ) -> Result<&ActiveSession, SessionError> {
        self.guard(operation, target)?;
        match self {
            SessionState::Active(session) => Ok(session),
            _ => Err(SessionError::invalid_transition(operation, self.phase())),
        }
    }

    fn awaiting_reply(&self, session_id: SessionId) -> Result<&ActiveSession, SessionError> {
        match self {
            SessionState::AwaitingReply(session) if session.id == session_id => Ok(session),
            _ => Err(SessionError::superseded(session_id)),
        }
    }

    fn awaiting_evaluation(&self, session_id: SessionId) -> Result<&ActiveSession, SessionError> {
        match self {
            SessionState::AwaitingEvaluation(session) if session.id == session_id => Ok(session),
            _ => Err(SessionError::superseded(session_id)),
        }
    }
}
