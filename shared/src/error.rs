//! Unified error type for the client core
//!
//! The source system signaled failure through `false`/`null` sentinels that
//! callers could silently ignore. Here every fallible operation returns
//! [`AppResult`], and the error carries which of the four failure kinds
//! occurred:
//!
//! - [`AppError::Persistence`]: the document store failed to read, write or
//!   decode
//! - [`AppError::NotFound`]: an id was not present in its aggregate
//! - [`AppError::InvalidState`]: a transition guard was violated (e.g.
//!   cancelling a paid order)
//! - [`AppError::Validation`]: malformed input (empty cart at checkout,
//!   bad address, out-of-range amounts)

use thiserror::Error;

/// Unified error type for all service operations
#[derive(Debug, Error)]
pub enum AppError {
    /// Store read/write/decode failed
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Entity not found within its aggregate
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Attempted transition violates a status guard
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input failed validation
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    // ========== Convenient constructors ==========

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Create a NotFound error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error is a guard violation
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Whether this error is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("document decode failed: {err}"))
    }
}

/// Result type for all service operations
pub type AppResult<T> = Result<T, AppError>;
