//! Provisioner error types

use thiserror::Error;

/// Result type for provisioner operations
pub type ProvisionerResult<T> = Result<T, ProvisionerError>;

/// Provisioner error types
#[derive(Error, Debug)]
pub enum ProvisionerError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Remote transport error: {message}")]
    Transport { message: String },

    #[error("User store error: {message}")]
    UserStore { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProvisionerError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ProvisionerError::InvalidConfiguration { message: message.into() }
    }
}

impl From<reqwest::Error> for ProvisionerError {
    fn from(err: reqwest::Error) -> Self {
        ProvisionerError::Transport { message: err.to_string() }
    }
}

impl From<url::ParseError> for ProvisionerError {
    fn from(err: url::ParseError) -> Self {
        ProvisionerError::InvalidConfiguration { message: format!("invalid base URL: {err}") }
    }
}
