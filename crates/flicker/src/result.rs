//! Result and error types for Flicker.

use crate::subject::FlickerSubjectError;
use thiserror::Error;

/// Result type for Flicker operations
pub type FlickerResult<T> = Result<T, FlickerError>;

/// Errors that can occur in Flicker
#[derive(Debug, Error)]
pub enum FlickerError {
    /// The trace has no entries
    #[error("Trace is empty")]
    EmptyTrace,

    /// An assertion over the trace failed
    #[error("{0}")]
    Assertion(Box<FlickerSubjectError>),

    /// Configuration is unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Fixture error (synthetic trace or scenario setup failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FlickerError {
    /// The assertion failure carried by this error, if any
    #[must_use]
    pub fn as_assertion(&self) -> Option<&FlickerSubjectError> {
        match self {
            Self::Assertion(failure) => Some(failure),
            _ => None,
        }
    }

    /// Check if this is the empty trace error
    #[must_use]
    pub const fn is_empty_trace(&self) -> bool {
        matches!(self, Self::EmptyTrace)
    }
}

impl From<FlickerSubjectError> for FlickerError {
    fn from(failure: FlickerSubjectError) -> Self {
        Self::Assertion(Box::new(failure))
    }
}
