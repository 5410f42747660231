//! HTTP handlers for training session endpoints.
//!
//! Controller operations that call the model run on a detached task, so a
//! client that disconnects mid-request never cancels an issued call.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::training::{ControllerError, SessionController};
use crate::domain::training::{ScenarioDefaults, ScenarioDraft, SessionError};

use super::dto::{
    ErrorResponse, EvaluationResponse, HealthResponse, ReplyResponse, ScenarioDefaultsResponse,
    SendMessageRequest, SessionResponse, StartSessionRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct TrainingAppState {
    pub controller: Arc<SessionController>,
    pub defaults: Arc<ScenarioDefaults>,
}

impl TrainingAppState {
    pub fn new(controller: Arc<SessionController>, defaults: ScenarioDefaults) -> Self {
        Self {
            controller,
            defaults: Arc::new(defaults),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/scenario/defaults - Setup form defaults and difficulty options
pub async fn get_scenario_defaults(State(state): State<TrainingAppState>) -> impl IntoResponse {
    Json(ScenarioDefaultsResponse::from(state.defaults.as_ref()))
}

/// GET /api/session - Current session snapshot
pub async fn get_session(State(state): State<TrainingAppState>) -> impl IntoResponse {
    Json(SessionResponse::from(state.controller.snapshot().await))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST/DELETE endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/session - Start a session
pub async fn start_session(
    State(state): State<TrainingAppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, TrainingApiError> {
    let config = ScenarioDraft::from(request)
        .resolve(&state.defaults)
        .map_err(|e| TrainingApiError::BadRequest(e.to_string()))?;

    let snapshot = state.controller.start_session(config).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(snapshot))))
}

/// POST /api/session/messages - Send an agent message and receive the reply
pub async fn send_message(
    State(state): State<TrainingAppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, TrainingApiError> {
    let controller = state.controller.clone();
    let outcome =
        detached(async move { controller.submit_agent_message(request.text).await }).await??;

    Ok(Json(ReplyResponse::from(outcome)))
}

/// POST /api/session/retry - Retry a failed customer reply
pub async fn retry_reply(
    State(state): State<TrainingAppState>,
) -> Result<impl IntoResponse, TrainingApiError> {
    let controller = state.controller.clone();
    let outcome = detached(async move { controller.retry_reply().await }).await??;

    Ok(Json(ReplyResponse::from(outcome)))
}

/// POST /api/session/evaluation - End the session and request feedback
pub async fn end_session(
    State(state): State<TrainingAppState>,
) -> Result<impl IntoResponse, TrainingApiError> {
    let controller = state.controller.clone();
    let outcome = detached(async move { controller.end_session().await }).await??;

    Ok(Json(EvaluationResponse::from(outcome)))
}

/// DELETE /api/session - Reset to configuration
pub async fn reset_session(State(state): State<TrainingAppState>) -> impl IntoResponse {
    Json(SessionResponse::from(state.controller.reset().await))
}

/// Runs `fut` to completion on its own task regardless of the request's fate.
async fn detached<F, T>(fut: F) -> Result<T, TrainingApiError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut).await.map_err(|e| {
        tracing::error!(error = %e, "Session task failed");
        TrainingApiError::Internal("Session task failed".to_string())
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub enum TrainingApiError {
    BadRequest(String),
    Conflict { code: &'static str, message: String },
    Upstream { message: String, retryable: bool },
    Internal(String),
}

impl From<ControllerError> for TrainingApiError {
    fn from(err: ControllerError) -> Self {
        let message = err.to_string();
        match err {
            ControllerError::Session(SessionError::Validation(_)) => {
                TrainingApiError::BadRequest(message)
            }
            ControllerError::Session(SessionError::Busy { .. }) => TrainingApiError::Conflict {
                code: "BUSY",
                message,
            },
            ControllerError::Session(SessionError::Superseded { .. }) => {
                TrainingApiError::Conflict {
                    code: "SUPERSEDED",
                    message,
                }
            }
            ControllerError::Session(SessionError::InvalidTransition { .. })
            | ControllerError::Session(SessionError::NothingToRetry) => {
                TrainingApiError::Conflict {
                    code: "INVALID_STATE_TRANSITION",
                    message,
                }
            }
            ControllerError::Generation(e) | ControllerError::Evaluation(e) => {
                TrainingApiError::Upstream {
                    message,
                    retryable: e.is_retryable(),
                }
            }
        }
    }
}

impl IntoResponse for TrainingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            TrainingApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            TrainingApiError::Conflict { code, message } => {
                (StatusCode::CONFLICT, ErrorResponse::conflict(code, message))
            }
            TrainingApiError::Upstream { message, retryable } => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::ai_provider(message, retryable),
            ),
            TrainingApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(msg))
            }
        };

        (status, Json(error)).into_response()
    }
}
