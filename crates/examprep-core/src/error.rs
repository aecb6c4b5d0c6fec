//! Error types for ExamPrep.

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ExamPrepError>;

#[derive(Debug, Error)]
pub enum ExamPrepError {
    /// Malformed or missing request fields.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation conflicts with the current state of a record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The embedding or chat call itself failed.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{provider}' timed out after {secs}s")]
    ProviderTimeout { provider: String, secs: u64 },

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("API key missing for provider: {0}")]
    ApiKeyMissing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// Model output could not be parsed or validated. `raw` keeps the
    /// unmodified response for operators.
    #[error("Invalid model output: {message}")]
    Format { message: String, raw: Option<String> },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExamPrepError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn format(msg: impl Into<String>, raw: Option<String>) -> Self {
        Self::Format {
            message: msg.into(),
            raw,
        }
    }

    /// Wrap any displayable storage error.
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }

    /// Whether the failure came from an external model call.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::ProviderTimeout { .. }
                | Self::ProviderNotFound(_)
                | Self::ApiKeyMissing(_)
                | Self::Http(_)
        )
    }
}
