//! HTTP adapter for the training session.
//!
//! Exposes the single session controller to the browser front end.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{health, TrainingAppState};
pub use routes::training_router;
