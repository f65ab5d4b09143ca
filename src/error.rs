//! Top-level error type for the CLI

use thiserror::Error;

use crate::cf::CfApiError;
use crate::clone::CloneError;

/// Errors surfaced to the CLI user
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] CfApiError),

    #[error(transparent)]
    Clone(#[from] CloneError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias used across the crate
pub type Result<T> = std::result::Result<T, PulseError>;
