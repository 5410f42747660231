//! Errors raised by session lifecycle operations.

use thiserror::Error;

use crate::domain::foundation::ValidationError;

use super::SessionPhase;

/// Why a session operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {operation} while session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: SessionPhase,
    },

    #[error("A model call is already outstanding ({phase})")]
    Busy { phase: SessionPhase },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Last turn already has a customer reply; nothing to retry")]
    NothingToRetry,

    #[error("Session {session_id} was reset before the call completed")]
    Superseded { session_id: String },
}

impl SessionError {
    pub fn invalid_transition(operation: &'static str, phase: SessionPhase) -> Self {
        SessionError::InvalidTransition { operation, phase }
    }

    pub fn superseded(session_id: impl ToString) -> Self {
        SessionError::Superseded {
            session_id: session_id.to_string(),
        }
    }
}
