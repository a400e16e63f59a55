//! Error types and handling
//!
//! Every engine operation returns [`EngineResult`]. Store failures propagate
//! unchanged through [`EngineError::Store`]; searches that match nothing are
//! successes with empty results, never errors.

use thiserror::Error;

use crate::area::SelectorError;
use crate::store::StoreError;

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input failed validation (missing fields, malformed alias, negative days)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The write would create a duplicate
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The data-access layer failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SelectorError> for EngineError {
    fn from(error: SelectorError) -> Self {
        EngineError::Validation(error.to_string())
    }
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Check if the caller caused the error
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "Validation",
            EngineError::NotFound { .. } => "Not Found",
            EngineError::Conflict(_) => "Conflict",
            EngineError::Store(_) => "Store",
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientId;

    #[test]
    fn test_error_creation() {
        let error = EngineError::validation("days must not be negative");
        assert!(matches!(error, EngineError::Validation(_)));
        assert_eq!(error.to_string(), "Validation failed: days must not be negative");

        let error = EngineError::not_found("Client", ClientId(42));
        assert_eq!(error.to_string(), "Client not found: CLIENT_42");
    }

    #[test]
    fn test_store_error_propagates_unchanged() {
        let error: EngineError = StoreError::unavailable("connection refused").into();
        assert!(matches!(error, EngineError::Store(StoreError::Unavailable(_))));
        assert_eq!(error.to_string(), "Store unavailable: connection refused");
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_selector_error_is_validation() {
        let error: EngineError = SelectorError::UnknownAlias("bogus".to_string()).into();
        assert!(matches!(error, EngineError::Validation(_)));
        assert!(error.is_client_error());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(EngineError::validation("x").category(), "Validation");
        assert_eq!(EngineError::not_found("Event", 7).category(), "Not Found");
        assert_eq!(EngineError::conflict("x").category(), "Conflict");
        assert_eq!(EngineError::Store(StoreError::constraint("x")).category(), "Store");
    }
}
