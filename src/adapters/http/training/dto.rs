//! HTTP DTOs for training session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::training::{EvaluationOutcome, ReplyOutcome, SessionSnapshot};
use crate::domain::training::{
    DifficultyTier, ScenarioConfig, ScenarioDefaults, ScenarioDraft, SessionPhase, Speaker, Turn,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a session. Omitted fields take the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<StartSessionRequest> for ScenarioDraft {
    fn from(req: StartSessionRequest) -> Self {
        ScenarioDraft {
            first_name: req.first_name,
            last_name: req.last_name,
            difficulty: req.difficulty,
            balance: req.balance,
            reason: req.reason,
        }
    }
}

/// Request to send an agent message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One transcript turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub speaker: Speaker,
    pub text: String,
    pub at: String,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            speaker: turn.speaker(),
            text: turn.text().to_string(),
            at: turn.at().as_datetime().to_rfc3339(),
        }
    }
}

/// Scenario of the running session.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResponse {
    pub customer_name: String,
    pub difficulty: DifficultyTier,
    pub reason: String,
    pub balance: f64,
}

impl From<&ScenarioConfig> for ScenarioResponse {
    fn from(config: &ScenarioConfig) -> Self {
        Self {
            customer_name: config.customer_name().to_string(),
            difficulty: config.difficulty(),
            reason: config.reason().to_string(),
            balance: config.balance(),
        }
    }
}

/// Full session view.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioResponse>,
    pub transcript: Vec<TurnResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            session_id: snapshot.session_id.map(|id| id.to_string()),
            scenario: snapshot.scenario.as_ref().map(Into::into),
            transcript: snapshot.transcript.turns().iter().map(Into::into).collect(),
            feedback: snapshot.feedback,
            busy: snapshot.busy,
            last_error: snapshot.last_error,
        }
    }
}

/// Reply to an agent message (or a retry).
#[derive(Debug, Clone, Serialize)]
pub struct ReplyResponse {
    pub reply: TurnResponse,
    pub session: SessionResponse,
}

impl From<ReplyOutcome> for ReplyResponse {
    fn from(outcome: ReplyOutcome) -> Self {
        Self {
            reply: (&outcome.reply).into(),
            session: outcome.snapshot.into(),
        }
    }
}

/// Supervisor feedback for an ended session.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    pub feedback: String,
    pub session: SessionResponse,
}

impl From<EvaluationOutcome> for EvaluationResponse {
    fn from(outcome: EvaluationOutcome) -> Self {
        Self {
            feedback: outcome.feedback,
            session: outcome.snapshot.into(),
        }
    }
}

/// A selectable difficulty with its behavior description.
#[derive(Debug, Clone, Serialize)]
pub struct DifficultyOption {
    pub value: DifficultyTier,
    pub behavior: &'static str,
}

/// Values the setup form is pre-populated with.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioDefaultsResponse {
    pub first_name: String,
    pub last_name: String,
    pub difficulty: DifficultyTier,
    pub balance: f64,
    pub reason: String,
    pub difficulties: Vec<DifficultyOption>,
}

impl From<&ScenarioDefaults> for ScenarioDefaultsResponse {
    fn from(defaults: &ScenarioDefaults) -> Self {
        Self {
            first_name: defaults.first_name.clone(),
            last_name: defaults.last_name.clone(),
            difficulty: defaults.difficulty,
            balance: defaults.balance,
            reason: defaults.reason.clone(),
            difficulties: DifficultyTier::ALL
                .into_iter()
                .map(|tier| DifficultyOption {
                    value: tier,
                    behavior: tier.behavior(),
                })
                .collect(),
        }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn ai_provider(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: "AI_PROVIDER_ERROR".to_string(),
            message: message.into(),
            details: Some(serde_json::json!({ "retryable": retryable })),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
