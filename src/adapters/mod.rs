//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Model providers (Gemini, mock)
//! - `http` - REST API consumed by the browser front end

pub mod ai;
pub mod http;

pub use ai::{GeminiConfig, GeminiProvider, MockAIProvider, MockError};
pub use http::{app_router, TrainingAppState};
