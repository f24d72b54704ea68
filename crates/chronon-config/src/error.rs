//! Configuration error types

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    ValidationError { key: &'static str, message: String },

    #[error("XDG directory error: {0}")]
    XdgError(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, message: impl Display) -> Self {
        Self::ValidationError {
            key,
            message: message.to_string(),
        }
    }
}
