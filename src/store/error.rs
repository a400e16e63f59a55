//! Errors reported by store implementations

use thiserror::Error;

/// Errors raised by the data-access layer.
///
/// The engine never retries these; they surface to the caller unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write or a loaded dataset violated a store constraint
    #[error("Store constraint violated: {0}")]
    Constraint(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a constraint error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
