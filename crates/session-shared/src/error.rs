//! Application error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
