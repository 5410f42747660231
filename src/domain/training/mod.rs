//! Training domain: scenarios, transcripts and the session lifecycle.

mod difficulty;
mod errors;
pub mod prompts;
mod scenario;
mod session;
mod transcript;

pub use difficulty::DifficultyTier;
pub use errors::SessionError;
pub use scenario::{
    customer_name_from_parts, ScenarioConfig, ScenarioDefaults, ScenarioDraft,
    FALLBACK_CUSTOMER_NAME,
};
pub use session::{ActiveSession, EvaluatedSession, PendingCall, SessionPhase, SessionState};
pub use transcript::{Speaker, Transcript, Turn};
