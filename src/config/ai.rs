//! AI provider configuration

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Gemini provider configuration
#[derive(Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if a Gemini key is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Builds the adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequired` when no API key is set.
    pub fn gemini_config(&self) -> Result<GeminiConfig, ValidationError> {
        let key = self
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ValidationError::MissingRequired("GEMINI_API_KEY"))?;

        Ok(GeminiConfig::new(key)
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout()))
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_gemini() {
            return Err(ValidationError::MissingRequired("GEMINI_API_KEY"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::InvalidModel);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AiConfig {
        AiConfig {
            gemini_api_key: Some("AIza-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_validation_requires_key() {
        assert!(matches!(
            AiConfig::default().validate(),
            Err(ValidationError::MissingRequired("GEMINI_API_KEY"))
        ));

        let blank = AiConfig {
            gemini_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = AiConfig {
            model: String::new(),
            ..configured()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidModel)));

        let config = AiConfig {
            base_url: "generativelanguage.googleapis.com".to_string(),
            ..configured()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl)));

        let config = AiConfig {
            timeout_secs: 0,
            ..configured()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));
    }

    #[test]
    fn test_gemini_config_carries_settings() {
        let config = AiConfig {
            model: "gemini-pro".to_string(),
            timeout_secs: 30,
            ..configured()
        };
        let gemini = config.gemini_config().unwrap();
        assert_eq!(gemini.model, "gemini-pro");
        assert_eq!(gemini.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("AIza-test"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
