//! Common error types shared across Caravel crates.

use thiserror::Error;

/// Common errors that occur across multiple Caravel crates.
///
/// This enum provides a unified set of error variants for recurring
/// scenarios like I/O failures, configuration issues, and lookups of apps,
/// endpoints, or containers that do not exist. Crate-specific errors should
/// wrap this type using the `#[from]` attribute.
#[derive(Debug, Error)]
pub enum CommonError {
    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    ///
    /// Indicates invalid or missing configuration values, such as an empty
    /// rack name or an unusable volume root.
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource not found.
    ///
    /// Used when a requested record (app, manifest, service, router
    /// endpoint, container, etc.) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Invalid state transition.
    ///
    /// Indicates that an operation was attempted against a record that is
    /// not in a valid state for it (e.g. updating an app mid-teardown).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Internal error.
    ///
    /// A catch-all for unexpected internal errors. Should include enough
    /// context for debugging.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommonError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Creates a new already exists error.
    #[must_use]
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists(resource.into())
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is an I/O error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is an already exists error.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let common_err: CommonError = io_err.into();
        assert!(common_err.is_io());
        assert!(common_err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_found_error() {
        let err = CommonError::not_found("app web");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: app web");
    }

    #[test]
    fn test_already_exists_error() {
        let err = CommonError::already_exists("endpoint api.web:443");
        assert!(err.is_already_exists());
        assert_eq!(err.to_string(), "already exists: endpoint api.web:443");
    }

    #[test]
    fn test_config_error() {
        let err = CommonError::config("rack name must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: rack name must not be empty"
        );
    }

    #[test]
    fn test_invalid_state_error() {
        let err = CommonError::invalid_state("app is already sleeping");
        assert_eq!(err.to_string(), "invalid state: app is already sleeping");
    }

    #[test]
    fn test_internal_error() {
        let err = CommonError::internal("convergence lock poisoned");
        assert_eq!(err.to_string(), "internal error: convergence lock poisoned");
    }
}
