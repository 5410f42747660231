//! Difficulty tiers for the simulated customer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How hard the simulated customer is to work with.
///
/// Exactly three tiers exist; anything else is rejected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DifficultyTier {
    /// Cooperative, resolves quickly.
    Easy,
    /// Hesitant, partial funds, lots of questions.
    #[default]
    Moderate,
    /// Defensive, contests the debt, needs high empathy.
    Difficult,
}

impl DifficultyTier {
    /// All tiers in presentation order.
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Moderate,
        DifficultyTier::Difficult,
    ];

    /// Wire/prompt label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "EASY",
            DifficultyTier::Moderate => "MODERATE",
            DifficultyTier::Difficult => "DIFFICULT",
        }
    }

    /// Behavioral policy the customer follows at this tier.
    pub fn behavior(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => {
                "Cooperative, friendly, willing to pay or discuss plans immediately."
            }
            DifficultyTier::Moderate => {
                "Hesitant, needs convincing, might only have partial funds, asks many questions."
            }
            DifficultyTier::Difficult => {
                "Defensive, frustrated, might question the debt's legitimacy, requires very high empathy and professional firmness."
            }
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DifficultyTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ValidationError::unknown_value(
                    "difficulty",
                    &["EASY", "MODERATE", "DIFFICULT"],
                    trimmed,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_moderate() {
        assert_eq!(DifficultyTier::default(), DifficultyTier::Moderate);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("easy".parse::<DifficultyTier>().unwrap(), DifficultyTier::Easy);
        assert_eq!(" Moderate ".parse::<DifficultyTier>().unwrap(), DifficultyTier::Moderate);
        assert_eq!("DIFFICULT".parse::<DifficultyTier>().unwrap(), DifficultyTier::Difficult);
    }

    #[test]
    fn rejects_unknown_tier() {
        let err = "NIGHTMARE".parse::<DifficultyTier>().unwrap_err();
        assert_eq!(err.field(), "difficulty");
        assert!(err.to_string().contains("NIGHTMARE"));
    }

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&DifficultyTier::Difficult).unwrap();
        assert_eq!(json, "\"DIFFICULT\"");
    }

    #[test]
    fn deserialize_rejects_unknown_tier() {
        assert!(serde_json::from_str::<DifficultyTier>("\"HARD\"").is_err());
    }

    #[test]
    fn every_tier_has_distinct_behavior() {
        let behaviors: Vec<_> = DifficultyTier::ALL.iter().map(|t| t.behavior()).collect();
        assert_eq!(behaviors.len(), 3);
        assert_ne!(behaviors[0], behaviors[1]);
        assert_ne!(behaviors[1], behaviors[2]);
        assert!(DifficultyTier::Difficult.behavior().contains("legitimacy"));
    }
}
