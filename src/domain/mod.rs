//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `training` - Scenario configuration, transcripts, session lifecycle and prompt text

pub mod foundation;
pub mod training;
