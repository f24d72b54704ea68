//! Error types for the Chronon facade

use chronon_config::ConfigError;
use chronon_sim::SimError;
use chronon_time::TimeError;
use thiserror::Error;

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, ChrononError>;

/// Errors raised while turning configuration into a running simulator
#[derive(Debug, Error)]
pub enum ChrononError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("simulator error: {0}")]
    Sim(#[from] SimError),

    #[error("time error: {0}")]
    Time(#[from] TimeError),
}
