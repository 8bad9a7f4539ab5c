// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Input file not found
    FileNotFound(String),
    /// Requested range cannot produce any output
    InvalidTimeRange(String),
    /// A required media-library capability is missing
    BackendUnavailable(String),
    /// External tool could not be located
    ToolNotFound(String),
    /// External tool exited unsuccessfully
    ToolFailed { stage: String, status: Option<i32> },
    /// File system operation failed
    FsFail(String),
    /// Configuration could not be loaded or is invalid
    ConfigError(String),
    /// Processing error inside the media library
    ProcessingError(String),
}

impl DomainError {
    /// Whether the GIF converter may recover from this error by falling back
    pub fn is_recoverable_by_fallback(&self) -> bool {
        matches!(
            self,
            DomainError::ToolNotFound(_) | DomainError::ToolFailed { .. }
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FileNotFound(path) => write!(f, "Input file not found: {}", path),
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            DomainError::ToolNotFound(tool) => write!(f, "External tool not found: {}", tool),
            DomainError::ToolFailed { stage, status } => match status {
                Some(code) => write!(f, "{} exited with status {}", stage, code),
                None => write!(f, "{} terminated by signal", stage),
            },
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
