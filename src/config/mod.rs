//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DEBT_COLLECTOR_PRO` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use debt_collector_pro::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::domain::training::ScenarioDefaults;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Values the setup form is pre-populated with
    #[serde(default)]
    pub scenario: ScenarioDefaults,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DEBT_COLLECTOR_PRO` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DEBT_COLLECTOR_PRO__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DEBT_COLLECTOR_PRO__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `DEBT_COLLECTOR_PRO__SCENARIO__BALANCE=300` -> `scenario.balance = 300`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DEBT_COLLECTOR_PRO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.scenario
            .validate()
            .map_err(|e| ValidationError::InvalidScenarioDefaults(e.to_string()))?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::DifficultyTier;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them run one at a time.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DEBT_COLLECTOR_PRO__AI__GEMINI_API_KEY",
        "DEBT_COLLECTOR_PRO__AI__MODEL",
        "DEBT_COLLECTOR_PRO__SERVER__PORT",
        "DEBT_COLLECTOR_PRO__SERVER__ENVIRONMENT",
        "DEBT_COLLECTOR_PRO__SCENARIO__BALANCE",
        "DEBT_COLLECTOR_PRO__SCENARIO__DIFFICULTY",
        "DEBT_COLLECTOR_PRO__SCENARIO__FIRST_NAME",
    ];

    fn set_minimal_env() {
        env::set_var("DEBT_COLLECTOR_PRO__AI__GEMINI_API_KEY", "AIza-test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.ai.gemini_api_key.as_deref(), Some("AIza-test"));
        assert_eq!(config.ai.model, "gemini-3-flash-preview");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_scenario_defaults_when_unset() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.scenario, ScenarioDefaults::default());
    }

    #[test]
    fn test_scenario_overrides() {
        let config = load_with(&[
            ("DEBT_COLLECTOR_PRO__SCENARIO__BALANCE", "1200"),
            ("DEBT_COLLECTOR_PRO__SCENARIO__DIFFICULTY", "DIFFICULT"),
            ("DEBT_COLLECTOR_PRO__SCENARIO__FIRST_NAME", "Sam"),
        ])
        .unwrap();
        assert_eq!(config.scenario.balance, 1200.0);
        assert_eq!(config.scenario.difficulty, DifficultyTier::Difficult);
        assert_eq!(config.scenario.first_name, "Sam");
        assert_eq!(config.scenario.last_name, "Rivera");
    }

    #[test]
    fn test_is_production() {
        let config = load_with(&[("DEBT_COLLECTOR_PRO__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_custom_server_port() {
        let config = load_with(&[("DEBT_COLLECTOR_PRO__SERVER__PORT", "3000")]).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validate_rejects_negative_default_balance() {
        let config = load_with(&[("DEBT_COLLECTOR_PRO__SCENARIO__BALANCE", "-5")]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidScenarioDefaults(_))
        ));
    }
}
