//! Training session handlers.
//!
//! - `ResponseGenerator` - simulated customer replies
//! - `Evaluator` - supervisor feedback for a finished conversation
//! - `SessionController` - single-session orchestration and single-flight guard

mod evaluator;
mod response_generator;
mod session_controller;

pub use evaluator::Evaluator;
pub use response_generator::ResponseGenerator;
pub use session_controller::{
    ControllerError, EvaluationOutcome, ReplyOutcome, SessionController, SessionSnapshot,
};
