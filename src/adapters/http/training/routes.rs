//! Route configuration for training session endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    end_session, get_scenario_defaults, get_session, reset_session, retry_reply, send_message,
    start_session, TrainingAppState,
};

/// Creates the training router with all endpoints.
///
/// Routes:
/// - `GET /api/scenario/defaults` - Setup form defaults and difficulty options
/// - `GET /api/session` - Current session snapshot
/// - `POST /api/session` - Start a session
/// - `DELETE /api/session` - Reset to configuration
/// - `POST /api/session/messages` - Send an agent message
/// - `POST /api/session/retry` - Retry a failed reply
/// - `POST /api/session/evaluation` - End the session and get feedback
pub fn training_router() -> Router<TrainingAppState> {
    Router::new()
        .route("/api/scenario/defaults", get(get_scenario_defaults))
        .route(
            "/api/session",
            get(get_session).post(start_session).delete(reset_session),
        )
        .route("/api/session/messages", post(send_message))
        .route("/api/session/retry", post(retry_reply))
        .route("/api/session/evaluation", post(end_session))
}
