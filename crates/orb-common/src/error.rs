//! Error types shared across the OrbFood media services

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, OrbError>;

/// Main error type for shared code
#[derive(Error, Debug)]
pub enum OrbError {
    #[error("Configuration error: {0}")]
    Config(String),
}
