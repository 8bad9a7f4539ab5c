//! Error handling module for snipkit

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type at the library boundary
#[derive(Error, Debug)]
pub enum SnipkitError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Both GIF backends failed
    #[error("GIF conversion failed: external tool: {primary}; media library: {fallback}")]
    FallbackFailed {
        primary: String,
        fallback: DomainError,
    },

    /// Error raised by the domain layer
    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for SnipkitError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::FileNotFound(path) => SnipkitError::InputFileNotFound { path },
            other => SnipkitError::Domain(other),
        }
    }
}

/// Result type alias for snipkit operations
pub type SnipkitResult<T> = std::result::Result<T, SnipkitError>;
