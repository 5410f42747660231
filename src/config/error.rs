//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid CORS origin: {0:?}")]
    InvalidCorsOrigin(String),

    #[error("AI timeout must be between 1 and 600 seconds")]
    InvalidTimeout,

    #[error("AI model name cannot be empty")]
    InvalidModel,

    #[error("AI base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid scenario defaults: {0}")]
    InvalidScenarioDefaults(String),
}
