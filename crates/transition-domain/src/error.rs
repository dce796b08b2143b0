//! Error taxonomy for the transition domain.

use thiserror::Error;

/// Configuration errors. Always fatal: a config that fails validation must
/// never be used to score records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("config parse error ({format}): {message}")]
    ParseError { format: String, message: String },

    #[error("config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("enabled signal weights sum to {sum:.6}, {requirement}")]
    WeightSum { sum: f64, requirement: String },

    #[error("no signals are enabled")]
    NoEnabledSignals,
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::ValidationFailed {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors produced by domain operations outside configuration.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("non-finite number not permitted in canonical JSON")]
    NonFiniteNumber,

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
