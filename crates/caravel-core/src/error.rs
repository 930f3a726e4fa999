//! Error types for convergence operations.

use caravel_error::CommonError;
use thiserror::Error;

/// Result type alias for convergence operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while converging an app.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Common errors shared across Caravel crates.
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Manifest declared a resource type outside the supported set.
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    /// Container runtime call failure.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Router call failure.
    #[error("router error: {0}")]
    Router(String),

    /// App registry call failure.
    #[error("registry error: {0}")]
    Registry(String),
}

impl CoreError {
    /// Creates a new not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::Common(CommonError::not_found(resource))
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::Common(CommonError::invalid_state(msg))
    }

    /// Creates a new config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Common(CommonError::config(msg))
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Common(CommonError::internal(msg))
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Common(CommonError::NotFound(_)))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Common(CommonError::from(err))
    }
}
