//! Error types for harvesting.

use thiserror::Error;

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Errors that can occur while harvesting a remote catalog.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The peer could not be reached (connection failure or timeout).
    #[error("peer unreachable: {message}")]
    Unreachable {
        /// Description of the transport failure.
        message: String,
    },

    /// The peer reported a structured protocol-level error.
    #[error("remote error [{code}]: {message}")]
    Remote {
        /// The peer's reason code.
        code: String,
        /// The peer's message.
        message: String,
    },

    /// The response body could not be parsed, even after normalization.
    #[error("malformed response: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// A harvested record could not be mapped or stored.
    #[error("record rejected: {message}")]
    Record {
        /// Description of the rejection.
        message: String,
    },

    /// Local storage failed while persisting harvested records.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// Every output schema failed and none produced a page.
    #[error("harvest of {source_id} failed: no output schema yielded a page")]
    AllSchemasFailed {
        /// The source that failed.
        source_id: String,
    },
}

impl HarvestError {
    /// Creates a malformed-response error with the given message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Classifies a transport error from the HTTP client.
    #[must_use]
    pub fn from_transport(error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else {
            error.to_string()
        };
        Self::Unreachable { message }
    }
}
