//! Error types for meridian-catalog operations.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A query string could not be parsed.
    #[error("bad query: {message}")]
    BadQuery {
        /// Description of the parse failure.
        message: String,
    },

    /// A record graph could not be mapped to or from its tree form.
    ///
    /// Only unrecoverable conditions surface here (an unregistered root
    /// type, a malformed form). Property-level problems are logged and
    /// skipped instead.
    #[error("mapping error: {message}")]
    Mapping {
        /// Description of the mapping failure.
        message: String,
    },

    /// A core operation (schema lookup, storage) failed.
    #[error(transparent)]
    Core(#[from] meridian_core::Error),
}

impl CatalogError {
    /// Creates a new bad-query error with the given message.
    #[must_use]
    pub fn bad_query(message: impl Into<String>) -> Self {
        Self::BadQuery {
            message: message.into(),
        }
    }

    /// Creates a new mapping error with the given message.
    #[must_use]
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }
}
