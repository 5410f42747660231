//! Scenario configuration chosen before a session starts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::DifficultyTier;

/// Name used when both first and last name are blank.
pub const FALLBACK_CUSTOMER_NAME: &str = "Customer";

/// Immutable bundle describing the simulated customer.
///
/// # Invariants
///
/// - `customer_name` is non-empty
/// - `balance` is finite and non-negative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioConfig {
    customer_name: String,
    difficulty: DifficultyTier,
    reason: String,
    balance: f64,
}

impl ScenarioConfig {
    /// Creates a validated scenario. The name is trimmed; the reason is
    /// kept exactly as typed.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name or reason is blank
    /// - `InvalidFormat` if the balance is negative or not finite
    pub fn new(
        customer_name: impl Into<String>,
        difficulty: DifficultyTier,
        reason: impl Into<String>,
        balance: f64,
    ) -> Result<Self, ValidationError> {
        let customer_name = customer_name.into().trim().to_string();
        if customer_name.is_empty() {
            return Err(ValidationError::empty_field("customer_name"));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }
        validate_balance(balance)?;

        Ok(Self {
            customer_name,
            difficulty,
            reason,
            balance,
        })
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn difficulty(&self) -> DifficultyTier {
        self.difficulty
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }
}

/// Joins first and last name the way the setup form does.
pub fn customer_name_from_parts(first: &str, last: &str) -> String {
    let joined = format!("{} {}", first, last);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        FALLBACK_CUSTOMER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn validate_balance(balance: f64) -> Result<(), ValidationError> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(ValidationError::invalid_format(
            "balance",
            "must be a non-negative number",
        ));
    }
    Ok(())
}

/// Values the setup form is pre-populated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDefaults {
    pub first_name: String,
    pub last_name: String,
    pub difficulty: DifficultyTier,
    pub balance: f64,
    pub reason: String,
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            first_name: "Alex".to_string(),
            last_name: "Rivera".to_string(),
            difficulty: DifficultyTier::Moderate,
            balance: 450.0,
            reason: "Unpaid credit card statement from the holiday season".to_string(),
        }
    }
}

impl ScenarioDefaults {
    /// Checks the defaults themselves would produce a valid scenario.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_balance(self.balance)?;
        if self.reason.trim().is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }
        Ok(())
    }
}

/// Operator input for a new scenario. Omitted fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenarioDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub difficulty: Option<String>,
    pub balance: Option<f64>,
    pub reason: Option<String>,
}

impl ScenarioDraft {
    /// Resolves the draft against the defaults into a validated scenario.
    ///
    /// Blank names collapse to [`FALLBACK_CUSTOMER_NAME`]; a blank reason
    /// takes the default reason.
    ///
    /// # Errors
    ///
    /// - `UnknownValue` for an unrecognized difficulty
    /// - `InvalidFormat` for a negative or non-finite balance
    pub fn resolve(self, defaults: &ScenarioDefaults) -> Result<ScenarioConfig, ValidationError> {
        let first = self.first_name.unwrap_or_else(|| defaults.first_name.clone());
        let last = self.last_name.unwrap_or_else(|| defaults.last_name.clone());
        let difficulty = match self.difficulty {
            Some(raw) => raw.parse()?,
            None => defaults.difficulty,
        };
        let reason = match self.reason {
            Some(reason) if !reason.trim().is_empty() => reason,
            _ => defaults.reason.clone(),
        };

        ScenarioConfig::new(
            customer_name_from_parts(&first, &last),
            difficulty,
            reason,
            self.balance.unwrap_or(defaults.balance),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn new_trims_name_but_keeps_reason_as_typed() {
            let config =
                ScenarioConfig::new("  Alex Rivera ", DifficultyTier::Easy, " Gym fees ", 80.0)
                    .unwrap();
            assert_eq!(config.customer_name(), "Alex Rivera");
            assert_eq!(config.reason(), " Gym fees ");
            assert_eq!(config.difficulty(), DifficultyTier::Easy);
            assert_eq!(config.balance(), 80.0);
        }

        #[test]
        fn reason_reaches_persona_prompt_unchanged() {
            let config =
                ScenarioConfig::new("Alex", DifficultyTier::Easy, "  Gym fees\n", 80.0).unwrap();
            let prompt = crate::domain::training::prompts::persona_instruction(&config);
            assert!(prompt.contains("SCENARIO / REASON FOR DEBT: \"  Gym fees\n\"."));
        }

        #[test]
        fn rejects_blank_reason() {
            let err = ScenarioConfig::new("A", DifficultyTier::Easy, " \t ", 1.0).unwrap_err();
            assert_eq!(err.field(), "reason");
        }

        #[test]
        fn rejects_blank_name() {
            let err = ScenarioConfig::new("  ", DifficultyTier::Easy, "x", 1.0).unwrap_err();
            assert_eq!(err.field(), "customer_name");
        }

        #[test]
        fn rejects_negative_balance() {
            let err = ScenarioConfig::new("A", DifficultyTier::Easy, "x", -0.01).unwrap_err();
            assert_eq!(err.field(), "balance");
        }

        #[test]
        fn rejects_non_finite_balance() {
            assert!(ScenarioConfig::new("A", DifficultyTier::Easy, "x", f64::NAN).is_err());
            assert!(ScenarioConfig::new("A", DifficultyTier::Easy, "x", f64::INFINITY).is_err());
        }

        #[test]
        fn zero_balance_is_allowed() {
            assert!(ScenarioConfig::new("A", DifficultyTier::Easy, "x", 0.0).is_ok());
        }
    }

    mod customer_name {
        use super::*;

        #[test]
        fn joins_first_and_last() {
            assert_eq!(customer_name_from_parts("Alex", "Rivera"), "Alex Rivera");
        }

        #[test]
        fn single_part_is_trimmed() {
            assert_eq!(customer_name_from_parts("", "Rivera"), "Rivera");
            assert_eq!(customer_name_from_parts("Alex", " "), "Alex");
        }

        #[test]
        fn both_blank_falls_back() {
            assert_eq!(customer_name_from_parts(" ", ""), FALLBACK_CUSTOMER_NAME);
        }
    }

    mod draft {
        use super::*;

        #[test]
        fn empty_draft_uses_defaults() {
            let config = ScenarioDraft::default()
                .resolve(&ScenarioDefaults::default())
                .unwrap();
            assert_eq!(config.customer_name(), "Alex Rivera");
            assert_eq!(config.difficulty(), DifficultyTier::Moderate);
            assert_eq!(config.balance(), 450.0);
            assert!(config.reason().starts_with("Unpaid credit card"));
        }

        #[test]
        fn blank_names_become_customer() {
            let draft = ScenarioDraft {
                first_name: Some(String::new()),
                last_name: Some("  ".to_string()),
                ..Default::default()
            };
            let config = draft.resolve(&ScenarioDefaults::default()).unwrap();
            assert_eq!(config.customer_name(), "Customer");
        }

        #[test]
        fn blank_reason_takes_default() {
            let draft = ScenarioDraft {
                reason: Some("   ".to_string()),
                ..Default::default()
            };
            let config = draft.resolve(&ScenarioDefaults::default()).unwrap();
            assert_eq!(config.reason(), ScenarioDefaults::default().reason);
        }

        #[test]
        fn unknown_difficulty_is_rejected() {
            let draft = ScenarioDraft {
                difficulty: Some("EXTREME".to_string()),
                ..Default::default()
            };
            let err = draft.resolve(&ScenarioDefaults::default()).unwrap_err();
            assert_eq!(err.field(), "difficulty");
        }

        #[test]
        fn negative_balance_is_rejected() {
            let draft = ScenarioDraft {
                balance: Some(-5.0),
                ..Default::default()
            };
            assert!(draft.resolve(&ScenarioDefaults::default()).is_err());
        }

        #[test]
        fn deserializes_partial_json() {
            let draft: ScenarioDraft =
                serde_json::from_str(r#"{"first_name":"Sam","difficulty":"easy"}"#).unwrap();
            assert_eq!(draft.first_name.as_deref(), Some("Sam"));
            assert!(draft.last_name.is_none());
            let config = draft.resolve(&ScenarioDefaults::default()).unwrap();
            assert_eq!(config.customer_name(), "Sam Rivera");
            assert_eq!(config.difficulty(), DifficultyTier::Easy);
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(ScenarioDefaults::default().validate().is_ok());
        let bad = ScenarioDefaults {
            balance: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
