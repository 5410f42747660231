//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::training::{
    ControllerError, EvaluationOutcome, Evaluator, ReplyOutcome, ResponseGenerator,
    SessionController, SessionSnapshot,
};
