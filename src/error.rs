//! Error types for the diet chart client.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors loading a profile document.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Why a single generation attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("cannot connect to the server: {0}")]
    NetworkUnavailable(String),

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether another attempt may follow this failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Terminal outcome of a generation run that produced no plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause} (after {attempts} attempt(s))")]
pub struct GenerationFailure {
    /// The cause of the last attempt.
    pub cause: GenerationError,
    /// Number of attempts made.
    pub attempts: u32,
}

impl GenerationFailure {
    /// User-facing message offering the basic template instead.
    pub fn fallback_prompt(&self) -> String {
        let reason = match &self.cause {
            GenerationError::Timeout(_) => {
                "The request timed out after 2 minutes.".to_string()
            }
            GenerationError::ServerError { status: 504, .. } => {
                "The server is taking too long to respond.".to_string()
            }
            GenerationError::NetworkUnavailable(_) => "Cannot connect to the server.".to_string(),
            GenerationError::Cancelled => "Generation was cancelled.".to_string(),
            GenerationError::ServerError { message, .. } => message.clone(),
            GenerationError::InvalidResponse(reason) => reason.clone(),
        };
        format!(
            "Failed to generate diet chart. {reason} Would you like to use a basic template instead?"
        )
    }
}

/// Errors from the classification and persistence endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{endpoint} request failed: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("{endpoint} returned {status}: {message}")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
