//! Conversation transcript: ordered, append-only turns.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The simulated customer (model output).
    Customer,
    /// The trainee.
    Agent,
}

impl Speaker {
    /// Label used when a transcript is flattened into prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Customer => "CUSTOMER",
            Speaker::Agent => "AGENT",
        }
    }
}

/// One immutable utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    at: Timestamp,
}

impl Turn {
    /// Creates an agent turn. Text is kept verbatim.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is blank after trimming
    pub fn agent(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        Ok(Self {
            speaker: Speaker::Agent,
            text,
            at: Timestamp::now(),
        })
    }

    /// Creates a customer turn.
    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Customer,
            text: text.into(),
            at: Timestamp::now(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn at(&self) -> &Timestamp {
        &self.at
    }

    pub fn is_agent(&self) -> bool {
        self.speaker == Speaker::Agent
    }
}

/// Ordered sequence of turns. Appending yields a new transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript holding a single customer greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self::new().appended(Turn::customer(greeting))
    }

    /// Returns a copy of this transcript with `turn` at the end.
    pub fn appended(&self, turn: Turn) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend(self.turns.iter().cloned());
        turns.push(turn);
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// True when the agent spoke last and no reply followed.
    pub fn awaits_customer(&self) -> bool {
        self.last().is_some_and(Turn::is_agent)
    }

    /// Number of turns spoken by `speaker`.
    pub fn count_by(&self, speaker: Speaker) -> usize {
        self.turns.iter().filter(|t| t.speaker == speaker).count()
    }
}
